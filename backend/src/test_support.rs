//! Test doubles shared by unit tests across the crate.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    MockClaimRepository, MockEventRepository, MockNotificationRepository, MockPointsLedger,
    MockProductRepository, MockReportsRepository, MockStandRepository, MockTournamentRepository,
    MockUserRepository, Repositories,
};
use crate::domain::{Event, EventId, NotificationService, User, UserId};
use crate::domain::{Email, Nickname, Role};

/// Noon on the first day of the sample event.
pub fn sample_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("sample timestamp is valid"))
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// A two-day event that is active at [`sample_now`].
pub fn sample_event() -> Event {
    let start = sample_now() - TimeDelta::hours(3);
    Event {
        id: EventId::random(),
        name: "Summer Cup".to_owned(),
        description: String::new(),
        start_date: start,
        end_date: start + TimeDelta::days(2),
        is_active: true,
        created_by: UserId::random(),
        created_at: start,
    }
}

pub fn sample_user(nickname: &str, role: Role, total_points: i64) -> User {
    User {
        id: UserId::random(),
        nickname: Nickname::new(nickname).unwrap_or_else(|e| panic!("nickname: {e}")),
        email: Email::new(format!("{nickname}@example.com"))
            .unwrap_or_else(|e| panic!("email: {e}")),
        password_hash: String::new(),
        role,
        total_points,
        profile_image: None,
        created_at: sample_now(),
    }
}

/// One mock per persistence port; set expectations, then convert.
#[derive(Default)]
pub struct RepoMocks {
    pub users: MockUserRepository,
    pub events: MockEventRepository,
    pub tournaments: MockTournamentRepository,
    pub stands: MockStandRepository,
    pub products: MockProductRepository,
    pub claims: MockClaimRepository,
    pub ledger: MockPointsLedger,
    pub notifications: MockNotificationRepository,
    pub reports: MockReportsRepository,
}

impl RepoMocks {
    /// Accept any notification write so side effects do not need
    /// expectations in every test.
    pub fn allow_notifications(mut self) -> Self {
        self.notifications.expect_insert_many().returning(|_| Ok(()));
        self
    }

    pub fn into_repositories(self) -> Repositories {
        Repositories {
            users: Arc::new(self.users),
            events: Arc::new(self.events),
            tournaments: Arc::new(self.tournaments),
            stands: Arc::new(self.stands),
            products: Arc::new(self.products),
            claims: Arc::new(self.claims),
            ledger: Arc::new(self.ledger),
            notifications: Arc::new(self.notifications),
            reports: Arc::new(self.reports),
        }
    }
}

pub fn notification_service(repos: &Repositories, clock: Arc<dyn Clock>) -> NotificationService {
    NotificationService::new(repos.notifications.clone(), repos.users.clone(), clock)
}
