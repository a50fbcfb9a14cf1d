mod paths_test;
mod schema_test;
