pub mod attendance_record;
pub mod member;
pub mod pending_member;
pub mod qr_session;
