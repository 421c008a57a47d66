use json_lossless_pointer::format_json_pointer;

#[test]
fn test_awkward_keys_are_escaped() {
    let path = vec![
        "a/b".to_string(),
        "~".to_string(),
        "".to_string(),
        "~1".to_string(),
    ];
    assert_eq!(format_json_pointer(&path), "/a~1b/~0//~01");
}

#[test]
fn test_array_indexes_are_plain_steps() {
    assert_eq!(format_json_pointer(&["tags", "0", "name"]), "/tags/0/name");
}
