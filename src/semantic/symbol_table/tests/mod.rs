mod tests_type_algebra;
