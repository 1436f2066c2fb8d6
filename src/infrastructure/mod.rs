pub mod database;
pub mod plagiarism;
pub mod storage;
