mod aggregation_tests;
mod health_tests;
mod report_tests;
