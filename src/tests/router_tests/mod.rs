mod api_tests;
mod bulk_tests;
mod search_tests;
