pub mod backup;
pub mod file_repository;
pub mod file_service;
pub mod plagiarism;
pub mod staging;
pub mod storage;
