pub mod ids;

pub use ids::generate_session_id;
