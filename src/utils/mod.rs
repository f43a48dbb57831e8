pub mod otp;
pub mod student_id;
pub mod token;
