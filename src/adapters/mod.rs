pub mod db;
pub mod station_tcp;
pub mod status_file;
