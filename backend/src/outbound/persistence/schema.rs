//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Update both
//! together; `diesel print-schema` against a migrated database regenerates
//! this file.

diesel::table! {
    /// Registered accounts and their running points total.
    users (id) {
        id -> Uuid,
        nickname -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// Role storage name, `user` through `admin`.
        role -> Varchar,
        /// Always equal to the sum of the user's point transactions.
        total_points -> Int8,
        profile_image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    events (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        is_active -> Bool,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tournaments (id) {
        id -> Uuid,
        event_id -> Uuid,
        name -> Varchar,
        scheduled_time -> Timestamptz,
        points_reward -> Int8,
        /// Flat JSON object of string values.
        specifications -> Jsonb,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    stands (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        manager_id -> Uuid,
        event_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Uuid,
        stand_id -> Uuid,
        name -> Varchar,
        description -> Text,
        points_required -> Int8,
        is_active -> Bool,
        image_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Product claims; `(user_id, product_id)` is unique.
    claims (id) {
        id -> Uuid,
        user_id -> Uuid,
        product_id -> Uuid,
        stand_id -> Uuid,
        status -> Varchar,
        points_spent -> Int8,
        created_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
        processed_by -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Append-only points ledger. Redemptions are negative rows.
    point_transactions (id) {
        id -> Uuid,
        user_id -> Uuid,
        points -> Int8,
        source -> Varchar,
        tournament_id -> Nullable<Uuid>,
        claim_id -> Nullable<Uuid>,
        notes -> Nullable<Varchar>,
        created_at -> Timestamptz,
        created_by -> Uuid,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        title -> Varchar,
        message -> Text,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tournaments -> events (event_id));
diesel::joinable!(stands -> events (event_id));
diesel::joinable!(products -> stands (stand_id));
diesel::joinable!(claims -> products (product_id));
diesel::joinable!(point_transactions -> users (user_id));
diesel::joinable!(notifications -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    events,
    tournaments,
    stands,
    products,
    claims,
    point_transactions,
    notifications,
);
