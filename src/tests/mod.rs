mod derivative_tests;
mod lambda_tests;
mod property_tests;
mod subs_tests;
