mod verifier_tests;
