pub mod m202608150001_create_members;
pub mod m202608150002_create_qr_sessions;
pub mod m202608150003_create_attendance_records;
