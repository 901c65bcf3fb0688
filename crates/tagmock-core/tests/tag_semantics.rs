use std::collections::HashMap;

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tagmock_core::data::AREAS;
use tagmock_core::{Context, Mockable, Mocker, Value, from_fn};

fn fill<T: Mockable + Default>(mocker: &Mocker, rng: &mut ChaCha8Rng) -> T {
    let mut target = T::default();
    mocker
        .generate_into_with_rng(&mut target, &Context::background(), rng)
        .expect("generate");
    target
}

#[derive(Debug, Default, Mockable)]
struct Picks {
    #[tag(mock = "options=a b c")]
    letter: String,
    #[tag(mock = "options=7 8,weights=10 1")]
    weighted: u16,
    #[tag(mock = "gte=5,lte=5")]
    pinned: i32,
}

#[test]
fn options_are_uniform_without_weights() {
    let mocker = Mocker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..3000 {
        let picks: Picks = fill(&mocker, &mut rng);
        *counts.entry(picks.letter).or_default() += 1;
    }
    assert_eq!(counts.len(), 3);
    for (letter, count) in counts {
        assert!((850..1150).contains(&count), "{letter} picked {count} times");
    }
}

#[test]
fn weights_bias_options() {
    let mocker = Mocker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let sevens = (0..2200)
        .filter(|_| fill::<Picks>(&mocker, &mut rng).weighted == 7)
        .count();
    // expected 2000
    assert!((1900..2100).contains(&sevens), "7 picked {sevens} times");
}

#[test]
fn collapsed_range_is_constant() {
    let mocker = Mocker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..100 {
        assert_eq!(fill::<Picks>(&mocker, &mut rng).pinned, 5);
    }
}

#[derive(Debug, Default, Mockable)]
struct EmptyRanges {
    #[tag(mock = "gte=10,lt=10")]
    empty: i64,
    #[tag(mock = "gt=9,lte=3")]
    inverted: i64,
    #[tag(mock = "key=string")]
    unbounded_text: String,
    #[tag(mock = "key=integer")]
    unbounded_number: i64,
    #[tag(mock = "gte=3,lt=1")]
    inverted_len: Vec<u8>,
}

#[test]
fn empty_or_missing_ranges_leave_zero_values() {
    let mocker = Mocker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut target = EmptyRanges {
        empty: 9,
        inverted: 9,
        unbounded_text: "stale".to_string(),
        unbounded_number: 9,
        inverted_len: vec![1, 2],
    };
    mocker
        .generate_into_with_rng(&mut target, &Context::background(), &mut rng)
        .expect("generate");
    assert_eq!(target.empty, 0);
    assert_eq!(target.inverted, 0);
    assert_eq!(target.unbounded_text, "");
    assert_eq!(target.unbounded_number, 0);
    assert!(target.inverted_len.is_empty());
}

#[derive(Debug, Default, Mockable)]
struct Ranges {
    #[tag(mock = "gte=-3,lte=3")]
    signed: i8,
    #[tag(mock = "gte=-5,lte=3")]
    clamped: u8,
    #[tag(mock = "gte=250,lte=1000")]
    saturated: u8,
    #[tag(mock = "gt=0.1,lt=0.3")]
    tenths: f64,
    #[tag(mock = "gte=1.25,lte=1.25")]
    exact: f32,
}

#[test]
fn ranges_straddle_zero_and_clamp_to_width() {
    let mocker = Mocker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut seen_negative = false;
    let mut seen_positive = false;
    let mut seen_floor = false;
    let mut seen_ceiling = false;
    for _ in 0..500 {
        let ranges: Ranges = fill(&mocker, &mut rng);
        assert!((-3..=3).contains(&ranges.signed));
        seen_negative |= ranges.signed < 0;
        seen_positive |= ranges.signed > 0;
        assert!((0.2 - ranges.tenths).abs() < 1e-9, "tenths {}", ranges.tenths);
        assert_eq!(ranges.exact, 1.25);
        assert!(ranges.clamped <= 3, "clamped {}", ranges.clamped);
        seen_floor |= ranges.clamped == 0;
        assert!(ranges.saturated >= 250);
        seen_ceiling |= ranges.saturated == u8::MAX;
    }
    assert!(seen_negative && seen_positive);
    assert!(seen_floor && seen_ceiling);
}

#[derive(Debug, Default, Mockable)]
struct Sequences {
    #[tag(mock = "eq=3,into,key=string,gte=2,lte=2")]
    words: Vec<String>,
    #[tag(mock = "eq=2,into,eq=3,into,eq=7")]
    matrix: Vec<Vec<u8>>,
    #[tag(mock = "eq=4,into")]
    untouched: Vec<u32>,
    #[tag(mock = "gte=2,lt=5")]
    sized: Vec<bool>,
}

#[test]
fn deferred_tokens_shape_elements() {
    let mocker = Mocker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    for _ in 0..50 {
        let seq: Sequences = fill(&mocker, &mut rng);
        assert_eq!(seq.words.len(), 3);
        assert!(seq.words.iter().all(|word| word.len() == 2));
        assert_eq!(seq.matrix, vec![vec![7u8; 3]; 2]);
        assert_eq!(seq.untouched, vec![0; 4]);
        assert!((2..5).contains(&seq.sized.len()));
    }
}

#[derive(Debug, Default, Mockable)]
struct Skips {
    #[tag(mock = "key=integer,eq=1,-")]
    skipped: i32,
    #[tag(mock = "")]
    empty_tag: i32,
    #[tag(other = "eq=1")]
    other_marker: i32,
    #[tag(mock = "eq=2")]
    kept: i32,
}

#[test]
fn skip_and_foreign_markers_leave_fields_alone() {
    let mocker = Mocker::new();
    let mut target = Skips {
        skipped: 11,
        empty_tag: 12,
        other_marker: 13,
        kept: 0,
    };
    mocker.generate_into(&mut target).expect("generate");
    assert_eq!(target.skipped, 11);
    assert_eq!(target.empty_tag, 12);
    assert_eq!(target.other_marker, 13);
    assert_eq!(target.kept, 2);

    let schema = mocker.schema::<Skips>(&Context::background()).expect("schema");
    let skipped = schema.lookup("skipped").expect("skipped node");
    assert!(skipped.generator().is_none());
    assert!(skipped.tags().contains("eq"));
    assert!(schema.lookup("empty_tag").is_none());
}

#[derive(Debug, Default, Mockable)]
struct Domains {
    #[tag(mock = "key=addr,addr=county province")]
    address: String,
    #[tag(mock = "key=addr")]
    no_levels: String,
    #[tag(mock = "key=time,time=ts_s")]
    seconds: i64,
    #[tag(mock = "key=time,time=ts_ms")]
    millis: u64,
    #[tag(mock = "key=time")]
    no_layout: i64,
    #[tag(mock = "key=bool,options=true")]
    always: bool,
    #[tag(mock = "eq=false")]
    never: bool,
}

#[test]
fn domain_generators() {
    let mocker = Mocker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let before = Utc::now();
    let mut target = Domains {
        no_levels: "stale".to_string(),
        no_layout: 9,
        never: true,
        ..Domains::default()
    };
    mocker
        .generate_into_with_rng(&mut target, &Context::background(), &mut rng)
        .expect("generate");
    let after = Utc::now();

    let parts: Vec<&str> = target.address.split(' ').collect();
    assert_eq!(parts.len(), 2, "address {}", target.address);
    let province = AREAS
        .iter()
        .find(|province| province.name == parts[0])
        .expect("province first");
    assert!(
        province
            .cities
            .iter()
            .any(|city| city.counties.contains(&parts[1])),
        "county belongs to province"
    );
    assert_eq!(target.no_levels, "");

    assert!(target.seconds >= before.timestamp() && target.seconds <= after.timestamp());
    let millis = i64::try_from(target.millis).expect("fits");
    assert!(millis >= before.timestamp_millis() && millis <= after.timestamp_millis());
    assert_eq!(target.no_layout, 0);

    assert!(target.always);
    assert!(!target.never);
}

#[derive(Debug, Default, Mockable)]
struct Nested {
    #[tag(mock = "into")]
    inner: Inner,
    #[tag(mock = "eq=2,into")]
    items: Vec<Box<Inner>>,
}

#[derive(Debug, Default, Mockable)]
struct Inner {
    #[tag(mock = "eq=abc")]
    code: String,
}

#[test]
fn aliases_follow_the_field_path() {
    let mocker = Mocker::new();
    let schema = mocker.schema::<Nested>(&Context::background()).expect("schema");
    let aliases: Vec<&str> = schema.walk().iter().map(|field| field.node().alias()).collect();
    assert_eq!(
        aliases,
        vec!["", "inner", "inner.code", "items", "items.0", "items.0.code"]
    );
    let element = schema.lookup("items.0").expect("element");
    assert!(element.is_ptr());
    assert_eq!(element.generator_key(), Some("struct"));
    assert_eq!(element.parent().expect("parent").alias(), "items");

    let mut nested = Nested::default();
    mocker.generate_into(&mut nested).expect("generate");
    assert_eq!(nested.inner.code, "abc");
    assert_eq!(nested.items.len(), 2);
    assert!(nested.items.iter().all(|item| item.code == "abc"));
}

#[derive(Debug, Default, Mockable)]
struct Holder {
    #[tag(mock = "into")]
    profile: Option<Profile>,
    #[tag(mock = "into")]
    boxed: Box<Profile>,
    #[tag(mock = "into")]
    inline: Profile,
}

#[derive(Debug, Default, Mockable)]
struct Profile {
    #[tag(mock = "eq=7")]
    level: u8,
    note: String,
}

fn noted(note: &str) -> Profile {
    Profile {
        level: 0,
        note: note.to_string(),
    }
}

#[test]
fn pointer_fields_expand_only_tagged_pointee_fields() {
    let mocker = Mocker::new();
    let mut holder = Holder {
        profile: None,
        boxed: Box::new(noted("stale")),
        inline: noted("kept"),
    };
    mocker.generate_into(&mut holder).expect("generate");

    let profile = holder.profile.as_ref().expect("allocated");
    assert_eq!(profile.level, 7);
    assert_eq!(profile.note, "");
    // pointers are re-pointed at a fresh zero value before expansion
    assert_eq!(holder.boxed.level, 7);
    assert_eq!(holder.boxed.note, "");
    assert_eq!(holder.inline.level, 7);
    assert_eq!(holder.inline.note, "kept");

    let schema = mocker.schema::<Holder>(&Context::background()).expect("schema");
    let aliases: Vec<&str> = schema.walk().iter().map(|field| field.node().alias()).collect();
    assert_eq!(
        aliases,
        vec!["", "profile", "profile.level", "boxed", "boxed.level", "inline", "inline.level"]
    );
    assert_eq!(schema.lookup("profile").expect("profile").generator_key(), Some("struct"));
    assert_eq!(schema.lookup("inline").expect("inline").generator_key(), None);
}

#[derive(Debug, Default, Mockable)]
struct Resettable {
    #[tag(mock = "key=blank")]
    profile: Profile,
}

#[test]
fn zero_values_reset_tagged_fields_of_derived_structs() {
    let mocker = Mocker::new();
    mocker.register_generator("blank", from_fn(|_ctx, _rng| Ok(Value::Zero)));
    let mut target = Resettable {
        profile: Profile {
            level: 9,
            note: "kept".to_string(),
        },
    };
    mocker.generate_into(&mut target).expect("generate");
    assert_eq!(target.profile.level, 0);
    assert_eq!(target.profile.note, "kept");
}

#[derive(Debug, Default, Mockable)]
struct Tagged<T> {
    #[tag(mock = "eq=3")]
    value: T,
    #[tag(mock = "eq=2,into,eq=5")]
    values: Vec<T>,
}

#[derive(Debug, Default, Mockable)]
struct Label<T>(T);

#[derive(Debug, Default, Mockable)]
struct Labelled {
    #[tag(mock = "eq=hi")]
    label: Label<String>,
}

#[test]
fn generic_structs_are_filled_per_instantiation() {
    let mocker = Mocker::new();
    let mut small: Tagged<u8> = Tagged::default();
    mocker.generate_into(&mut small).expect("u8");
    assert_eq!(small.value, 3);
    assert_eq!(small.values, vec![5, 5]);

    let mut wide: Tagged<i64> = Tagged::default();
    mocker.generate_into(&mut wide).expect("i64");
    assert_eq!(wide.value, 3);
    assert_eq!(mocker.cached_schemas(), 2);

    let mut labelled = Labelled::default();
    mocker.generate_into(&mut labelled).expect("label");
    assert_eq!(labelled.label.0, "hi");
}
