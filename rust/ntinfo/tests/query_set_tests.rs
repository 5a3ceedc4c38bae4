use ntinfo::{ErrorKind, ErrorMode, InfoAccess, NtStatus, Outcome, QueryStatus};
use ntinfo_bytes::accounting;
use ntinfo_testkit::{
    Attempt, LengthReport, ScriptedResource, TestClass, TestRights, payloads::BasicInfo,
};

fn sample() -> BasicInfo {
    BasicInfo {
        id: 0x1122_3344_5566_7788,
        created: 42,
        flags: 0b101,
        count: 3,
    }
}

#[test]
fn test_query_fixed_returns_written_payload() {
    let expected = sample();
    let res = ScriptedResource::with_data(bytemuck::bytes_of(&expected).to_vec());
    let before = accounting::snapshot();
    let outcome = res
        .query_fixed(TestClass::Basic, BasicInfo::default(), ErrorMode::Propagate)
        .unwrap();
    assert_eq!(outcome, Outcome::Success(expected));
    assert_eq!(res.query_sizes(), vec![24]);
    assert_eq!(accounting::snapshot().since(&before).live(), 0);
}

#[test]
fn test_query_fixed_failure_modes() {
    let res = ScriptedResource::with_len(64).report(LengthReport::Exact);

    let outcome = res
        .query_fixed(TestClass::Basic, BasicInfo::default(), ErrorMode::Report)
        .unwrap();
    assert_eq!(outcome, Outcome::Failure(NtStatus::INFO_LENGTH_MISMATCH));

    let err = res
        .query_fixed(TestClass::Basic, BasicInfo::default(), ErrorMode::Propagate)
        .unwrap_err();
    assert_eq!(err.status(), NtStatus::INFO_LENGTH_MISMATCH);

    // No growth on the fixed path, whatever length was reported.
    assert_eq!(res.query_sizes(), vec![24, 24]);
}

#[test]
fn test_query_fixed_access_denied() {
    let res = ScriptedResource::with_len(24).rights(TestRights::SET);
    let err = res
        .query_fixed(TestClass::Basic, BasicInfo::default(), ErrorMode::Propagate)
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Status {
            status: NtStatus::ACCESS_DENIED,
            ..
        }
    ));
}

#[test]
fn test_query_fixed_informational_success() {
    let res = ScriptedResource::with_len(24);
    res.push_response(QueryStatus::new(NtStatus::from_u32(0x4000_0000), 24));
    let outcome = res
        .query_fixed(TestClass::Basic, 0u64, ErrorMode::Propagate)
        .unwrap();
    assert!(outcome.is_success());
}

#[test]
fn test_query_required_length() {
    let res = ScriptedResource::with_len(700);
    let len = res
        .query_required_length(TestClass::Name, &BasicInfo::default(), ErrorMode::Propagate)
        .unwrap();
    assert_eq!(len, Outcome::Success(700));

    let res = ScriptedResource::with_len(700).report(LengthReport::None);
    let len = res
        .query_required_length(TestClass::Name, &BasicInfo::default(), ErrorMode::Propagate)
        .unwrap();
    assert_eq!(len, Outcome::Success(0));
    assert_eq!(res.query_count(), 1);
}

#[test]
fn test_set_success_releases_buffer() {
    let res = ScriptedResource::with_len(0);
    let value = sample();
    let before = accounting::snapshot();
    let outcome = res
        .set(TestClass::Basic, &value, ErrorMode::Propagate)
        .unwrap();
    assert_eq!(outcome, Outcome::Success(NtStatus::SUCCESS));
    let delta = accounting::snapshot().since(&before);
    assert_eq!(delta.allocated, 1);
    assert_eq!(delta.live(), 0);
    assert_eq!(res.data(), bytemuck::bytes_of(&value));

    let roundtrip = res
        .query_fixed(TestClass::Basic, BasicInfo::default(), ErrorMode::Propagate)
        .unwrap();
    assert_eq!(roundtrip, Outcome::Success(value));
}

#[test]
fn test_set_failure_releases_buffer() {
    let res = ScriptedResource::with_len(0).set_status(NtStatus::INVALID_PARAMETER);
    let before = accounting::snapshot();
    let err = res
        .set(TestClass::Flags, &7u32, ErrorMode::Propagate)
        .unwrap_err();
    assert_eq!(err.status(), NtStatus::INVALID_PARAMETER);
    assert_eq!(accounting::snapshot().since(&before).live(), 0);

    let outcome = res
        .set(TestClass::Flags, &7u32, ErrorMode::Report)
        .unwrap();
    assert_eq!(outcome, Outcome::Failure(NtStatus::INVALID_PARAMETER));
    assert_eq!(accounting::snapshot().since(&before).live(), 0);
}

#[test]
fn test_set_is_attempted_once() {
    let res = ScriptedResource::with_len(0).set_status(NtStatus::BUFFER_TOO_SMALL);
    let outcome = res
        .set(TestClass::Flags, &1u16, ErrorMode::Report)
        .unwrap();
    assert_eq!(outcome.status(), NtStatus::BUFFER_TOO_SMALL);
    assert_eq!(
        res.attempts(),
        vec![Attempt::Set {
            class: TestClass::Flags,
            bytes: 1u16.to_ne_bytes().to_vec()
        }]
    );
}

#[test]
fn test_set_unsupported_and_bytes() {
    let res = ScriptedResource::with_len(0);
    let err = res
        .set_bytes(TestClass::Unsupported, b"xyz", ErrorMode::Propagate)
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Unsupported { .. }));

    let outcome = res
        .set_bytes(TestClass::Name, b"xyz", ErrorMode::Propagate)
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(res.data(), b"xyz");
}
