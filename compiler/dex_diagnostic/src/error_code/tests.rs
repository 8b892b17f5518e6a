use super::*;

#[test]
fn codes_round_trip_through_strings() {
    for &code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(code));
        assert_eq!(code.to_string(), code.as_str());
    }
    assert_eq!("e6002".parse::<ErrorCode>(), Ok(ErrorCode::E6002));
    assert!("E7777".parse::<ErrorCode>().is_err());
}

#[test]
fn phases_follow_the_first_digit() {
    assert!(ErrorCode::E0001.is_lexer_error());
    assert!(ErrorCode::E1002.is_parser_error());
    assert!(ErrorCode::E0003.is_parser_error());
    assert!(ErrorCode::E2005.is_semantic_error());
    assert!(ErrorCode::E6008.is_ctfe_error());
    assert!(ErrorCode::E9001.is_internal_error());
    assert!(!ErrorCode::E6001.is_semantic_error());
}

#[test]
fn every_code_is_described() {
    for &code in ErrorCode::ALL {
        assert!(!code.description().is_empty(), "{code} has no description");
    }
}
