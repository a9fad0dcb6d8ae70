pub mod admin_user;
pub mod replica_set;
pub mod seeder;
pub mod verify;
