//! Stands and their product catalogues.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    DeleteOutcome, EventRepository, ProductRepository, StandRepository, UserRepository,
};
use crate::domain::{
    Error, EventId, Product, ProductDraft, ProductId, RequestContext, Role, RuleViolation, Stand,
    StandDraft, StandId, ValidationErrors,
};

#[derive(Clone)]
pub struct StandService {
    stands: Arc<dyn StandRepository>,
    products: Arc<dyn ProductRepository>,
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl StandService {
    pub fn new(
        stands: Arc<dyn StandRepository>,
        products: Arc<dyn ProductRepository>,
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stands,
            products,
            events,
            users,
            clock,
        }
    }

    /// Validate the draft plus the references it makes: the event must
    /// exist and the manager must hold at least the stand manager role.
    async fn checked_draft(&self, draft: StandDraft) -> Result<StandDraft, Error> {
        let mut errors = match draft.clone().validate() {
            Ok(_) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.events.find_by_id(&draft.event_id).await?.is_none() {
            errors.push("eventId", "event not found");
        }
        match self.users.find_by_id(&draft.manager_id).await? {
            None => errors.push("managerId", "manager not found"),
            Some(manager) => errors.check(
                manager.role.at_least(Role::StandManager),
                "managerId",
                "manager must have the stand_manager role or higher",
            ),
        }
        errors.into_result(())?;
        Ok(draft.validate()?)
    }

    pub async fn create(&self, ctx: &RequestContext, draft: StandDraft) -> Result<Stand, Error> {
        ctx.require(Role::Admin)?;
        let draft = self.checked_draft(draft).await?;
        let stand = Stand {
            id: StandId::random(),
            name: draft.name,
            description: draft.description,
            manager_id: draft.manager_id,
            event_id: draft.event_id,
            created_at: self.clock.utc(),
        };
        self.stands.insert(&stand).await?;
        info!(stand_id = %stand.id, manager_id = %stand.manager_id, "stand created");
        Ok(stand)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: StandId,
        draft: StandDraft,
    ) -> Result<Stand, Error> {
        ctx.require(Role::Admin)?;
        let current = self.get(id).await?;
        let draft = self.checked_draft(draft).await?;
        let stand = Stand {
            name: draft.name,
            description: draft.description,
            manager_id: draft.manager_id,
            event_id: draft.event_id,
            ..current
        };
        if !self.stands.update(&stand).await? {
            return Err(Error::not_found(format!("stand {id} not found")));
        }
        Ok(stand)
    }

    pub async fn get(&self, id: StandId) -> Result<Stand, Error> {
        self.stands
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("stand {id} not found")))
    }

    pub async fn list(&self, event_id: Option<EventId>) -> Result<Vec<Stand>, Error> {
        Ok(self.stands.list(event_id).await?)
    }

    /// Delete a stand without claims, along with its products. Admin only.
    pub async fn delete(&self, ctx: &RequestContext, id: StandId) -> Result<(), Error> {
        ctx.require(Role::Admin)?;
        match self.stands.delete(&id).await? {
            DeleteOutcome::Deleted => {
                info!(stand_id = %id, "stand deleted");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(Error::not_found(format!("stand {id} not found"))),
            DeleteOutcome::InUse => Err(RuleViolation::StandHasClaims.into()),
        }
    }

    /// Add a product. Stand manager of the stand or admin.
    pub async fn create_product(
        &self,
        ctx: &RequestContext,
        stand_id: StandId,
        draft: ProductDraft,
    ) -> Result<Product, Error> {
        self.get(stand_id).await?.require_manager(ctx)?;
        let draft = draft.validate()?;
        let product = Product {
            id: ProductId::random(),
            stand_id,
            name: draft.name,
            description: draft.description,
            points_required: draft.points_required,
            is_active: true,
            image_url: draft.image_url,
            created_at: self.clock.utc(),
        };
        self.products.insert(&product).await?;
        info!(product_id = %product.id, %stand_id, "product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        ctx: &RequestContext,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, Error> {
        let current = self.get_product(id).await?;
        self.get(current.stand_id).await?.require_manager(ctx)?;
        let draft = draft.validate()?;
        let product = Product {
            name: draft.name,
            description: draft.description,
            points_required: draft.points_required,
            image_url: draft.image_url,
            ..current
        };
        self.store_product(&product).await?;
        Ok(product)
    }

    /// Enable or disable redemption of a product.
    pub async fn set_product_active(
        &self,
        ctx: &RequestContext,
        id: ProductId,
        is_active: bool,
    ) -> Result<Product, Error> {
        let current = self.get_product(id).await?;
        self.get(current.stand_id).await?.require_manager(ctx)?;
        let product = Product {
            is_active,
            ..current
        };
        self.store_product(&product).await?;
        info!(product_id = %id, is_active, "product availability changed");
        Ok(product)
    }

    async fn store_product(&self, product: &Product) -> Result<(), Error> {
        if self.products.update(product).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("product {} not found", product.id)))
        }
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }

    pub async fn list_products(
        &self,
        stand_id: StandId,
        active_only: bool,
    ) -> Result<Vec<Product>, Error> {
        self.get(stand_id).await?;
        Ok(self.products.list_for_stand(&stand_id, active_only).await?)
    }
}
