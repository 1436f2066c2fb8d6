pub mod file_type;
