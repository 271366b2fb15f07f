pub mod catalog_fixture;
