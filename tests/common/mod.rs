//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config,
//! and a full [`AppContext`]. The [`TestHarness::with_server`] constructor
//! starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use chrono::NaiveDate;
use serde_json::json;

use inne_core::config::Config;
use inne_core::{PaymentStatus, SessionStatus};
use inne_db::models::*;
use inne_db::pool::{init_memory_pool, DbPool};
use inne_db::queries;
use inne_server::context::AppContext;
use inne_server::router::build_router;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

/// Every row a session needs, already inserted.
pub struct Booking {
    pub location: Location,
    pub therapist: Therapist,
    pub customer: Customer,
    pub room: Room,
    pub option: TherapyOption,
}

impl Booking {
    pub fn new_session(&self) -> NewSession {
        NewSession {
            therapist_id: self.therapist.id,
            customer_id: self.customer.id,
            room_id: self.room.id,
            therapy_option_id: self.option.id,
            location_id: self.location.id,
            date: NaiveDate::from_ymd_opt(2026, 10, 21)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_minutes: 45,
            status: SessionStatus::Scheduled,
            feedback: None,
            payment_status: PaymentStatus::Pending,
        }
    }
}

pub fn contact(phone: &str) -> JsonMap {
    let mut m = JsonMap::new();
    m.insert("phone".into(), json!(phone));
    m
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), config);
        Self { ctx, db }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> inne_db::pool::PooledConnection {
        inne_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Insert a location with the given name.
    pub fn create_location(&self, name: &str) -> Location {
        queries::locations::create_location(
            &self.conn(),
            &NewLocation {
                name: name.into(),
                address: "123 Main St".into(),
                contact_info: contact("555-0100"),
            },
        )
        .expect("failed to create location")
    }

    /// Insert one of everything a session references.
    pub fn create_booking(&self) -> Booking {
        let conn = self.conn();
        let location = self.create_location("Downtown");

        let therapist = queries::therapists::create_therapist(
            &conn,
            &NewTherapist {
                name: "Ari Novak".into(),
                specialty: "Massage".into(),
                experience: 5,
                certifications: Some("LMT".into()),
                availability: Some(json!({"thu": ["10:00-16:00"]})),
                contact_info: contact("555-0110"),
                location_id: location.id,
            },
        )
        .expect("failed to create therapist");

        let customer = queries::customers::create_customer(
            &conn,
            &NewCustomer {
                name: "Jo Park".into(),
                age: 41,
                contact_info: contact("555-0111"),
                health_records: None,
                preferred_therapist_id: Some(therapist.id),
                payment_preferences: Some(json!(["card"])),
            },
        )
        .expect("failed to create customer");

        let room = queries::rooms::create_room(
            &conn,
            &NewRoom {
                room_number: "101".into(),
                capacity: 1,
                equipment: Some(json!(["massage table"])),
                availability: None,
                location_id: location.id,
            },
        )
        .expect("failed to create room");

        let option = queries::therapy_options::create_therapy_option(
            &conn,
            &NewTherapyOption {
                name: "Deep Tissue Massage".into(),
                kind: "individual".into(),
                duration_minutes: 45,
                price: 80.0,
                equipment_needed: Some(json!(["massage table"])),
                therapist_specialty_required: "Massage".into(),
            },
        )
        .expect("failed to create therapy option");

        Booking {
            location,
            therapist,
            customer,
            room,
            option,
        }
    }
}
