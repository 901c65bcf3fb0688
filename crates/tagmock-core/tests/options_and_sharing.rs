use std::io::Write;
use std::sync::Arc;
use std::thread;

use tagmock_core::{ConfigError, Context, Error, MockOptions, Mockable, Mocker};

#[derive(Debug, Default, Clone, PartialEq, Mockable)]
struct Profile {
    #[tag(mock = "key=integer,gte=1,lte=1000000")]
    id: u64,
    #[tag(mock = "key=string,gte=5,lte=20")]
    nickname: String,
    #[tag(mock = "key=decimal,gte=0.01,lte=99.99")]
    balance: f64,
    #[tag(mock = "gte=1,lte=4,into,options=red green blue")]
    colours: Vec<String>,
    #[tag(mock = "key=email")]
    email: String,
}

#[test]
fn seeded_mockers_are_deterministic() {
    let mocker = Mocker::with_options(MockOptions::default().with_seed(42)).expect("options");
    let mut first = Profile::default();
    let mut second = Profile::default();
    mocker.generate_into(&mut first).expect("first");
    mocker.generate_into(&mut second).expect("second");
    assert_eq!(first, second);

    let other = Mocker::with_options(MockOptions::default().with_seed(42)).expect("options");
    let mut third = Profile::default();
    other.generate_into(&mut third).expect("third");
    assert_eq!(first, third);
}

#[derive(Debug, Default, Mockable)]
struct CustomMarker {
    #[tag(fake = r"key=string;reg=^[a-z]{2,3}$|x;Y;lte=9")]
    code: String,
    #[tag(fake = "key=integer;eq=9", mock = "eq=1")]
    id: i32,
}

#[test]
fn options_load_from_toml() {
    let options = MockOptions::from_toml_str(
        r#"
        tag = "fake"
        separator = ";"
        seed = 7
        "#,
    )
    .expect("parse options");
    assert_eq!(options.tag, "fake");
    assert_eq!(options.separator, ";");
    assert_eq!(options.seed, Some(7));

    let mocker = Mocker::with_options(options).expect("mocker");
    let mut target = CustomMarker::default();
    mocker.generate_into(&mut target).expect("generate");
    assert_eq!(target.id, 9);
    assert!(
        target.code == "x;Y"
            || ((2..=3).contains(&target.code.len())
                && target.code.chars().all(|ch| ch.is_ascii_lowercase())),
        "code {}",
        target.code
    );
}

#[test]
fn options_load_from_file_and_default_missing_keys() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "seed = 3").expect("write");
    let options = MockOptions::load(file.path()).expect("load");
    assert_eq!(options, MockOptions::default().with_seed(3));
}

#[test]
fn invalid_options_are_rejected() {
    assert!(matches!(
        MockOptions::from_toml_str("separator = \"=\""),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        MockOptions::from_toml_str("tag = 5"),
        Err(ConfigError::Toml(_))
    ));
    let err = Mocker::with_options(MockOptions::default().with_tag(" ")).expect_err("empty tag");
    assert!(matches!(Error::from(err), Error::Config(ConfigError::Invalid(_))));
}

#[test]
fn one_mocker_serves_many_threads() {
    let mocker = Arc::new(Mocker::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let mocker = Arc::clone(&mocker);
            thread::spawn(move || {
                for _ in 0..50 {
                    let mut profile = Profile::default();
                    mocker.generate_into(&mut profile).expect("generate");
                    assert!((1..=1_000_000).contains(&profile.id));
                    assert!((5..=20).contains(&profile.nickname.len()));
                    assert!(profile.balance >= 0.01 && profile.balance <= 99.99);
                    assert!((1..=4).contains(&profile.colours.len()));
                    assert!(
                        profile
                            .colours
                            .iter()
                            .all(|colour| ["red", "green", "blue"].contains(&colour.as_str()))
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }
    assert_eq!(mocker.cached_schemas(), 1);

    let first = mocker.schema::<Profile>(&Context::background()).expect("schema");
    let second = mocker.schema::<Box<Profile>>(&Context::background()).expect("schema");
    assert!(Arc::ptr_eq(&first, &second));
}
