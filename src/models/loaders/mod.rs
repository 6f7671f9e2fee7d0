pub mod toml_loader;

pub use toml_loader::{
    load_all_submission_files, load_submission_file, load_test_catalog, parse_test_catalog,
};
