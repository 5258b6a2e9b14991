mod scan_flow_tests;
mod session_tests;
