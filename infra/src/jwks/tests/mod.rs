mod http_key_source_tests;
