mod endpoint_tests;
mod gateway_tests;
