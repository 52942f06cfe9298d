mod line_engine_tests;
