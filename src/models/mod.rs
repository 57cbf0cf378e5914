pub mod card;
pub mod draft_data;
pub mod draft_session;
