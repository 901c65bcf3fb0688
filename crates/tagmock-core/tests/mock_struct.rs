use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use serde::Serialize;

use tagmock_core::data::{AREAS, MOBILE_PHONE_PREFIXES};
use tagmock_core::{
    Context, GenerationError, Kind, Mockable, Mocker, TagValue, Value, from_fn, parser_fn,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Mockable)]
struct HobbyType(i32);

#[derive(Debug, Clone, Default, Serialize, Mockable)]
struct Hobby {
    #[tag(mock = "key=integer,eq=5")]
    id: i64,
    #[tag(mock = "key=integer,options=1 2 3")]
    ht: HobbyType,
    #[tag(mock = "key=string,gte=4,lte=23")]
    name: String,
    #[tag(mock = "gte=1,lte=5,into=1,key=string,gte=3,lte=6")]
    pros: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Mockable)]
struct Book {
    #[tag(mock = "key=integer,eq=5")]
    id: i64,
    #[tag(mock = "key=string,gte=4,lte=23")]
    name: String,
}

#[derive(Debug, Default, Serialize, Mockable)]
struct Man {
    #[tag(mock = "key=integer,eq=5")]
    id: i64,
    #[tag(mock = "key=ids")]
    ids: Vec<i64>,
    #[tag(mock = "key=chinese,chinese_tag=李明")]
    name: String,
    #[tag(mock = "key=integer,gte=23")]
    age: Option<i8>,
    #[tag(mock = "into=1")]
    hobby: Option<Hobby>,
    #[tag(mock = "eq=1,into=1")]
    hobbies: Vec<Option<Hobby>>,
    #[tag(mock = "eq=1,into=1,key=book")]
    books: Vec<Book>,
    #[tag(mock = "key=integer,options=2 3 4 5,weights=10 5 2 2")]
    option: i32,
    #[tag(mock = "key=decimal,gte=-23.235,lte=5.580")]
    decimal: f64,
    #[tag(mock = "key=mobile_phone")]
    mobile_phone: Option<String>,
    #[tag(mock = "key=email")]
    email: Option<String>,
    #[tag(mock = "key=addr,addr=city county")]
    address: Option<String>,
    #[tag(mock = "key=time,time=ts_ms")]
    create_time: Option<i64>,
    #[tag(mock = "key=time,time=%Y-%m-%d %H:%M:%S")]
    update_time: Option<String>,
    #[tag(mock = r"key=decimal,reg=[1-9]{3}\.\d{1,5}")]
    reg_decimal: f64,
    #[tag(mock = r"key=string,reg=[\x{4e00}-\x{9fa5}]{6,}")]
    reg_name: String,
    untagged: u32,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("tagmock_core=debug")
        .try_init();
}

fn mocker_with_custom_generators() -> Mocker {
    let mocker = Mocker::new();
    assert!(mocker.register_tag_parser(
        "chinese_tag",
        parser_fn(|_kind, _key, value| Ok(TagValue::Text(value.to_string()))),
    ));
    assert!(mocker.register_generator(
        "chinese",
        from_fn(|ctx, _rng| {
            if ctx.kind() != Kind::String {
                return Err(GenerationError::Unsupported("only strings".to_string()));
            }
            let name = ctx
                .tags()
                .get("chinese_tag")
                .and_then(|tag| tag.as_text())
                .unwrap_or("你好世界");
            Ok(Value::Text(name.to_string()))
        }),
    ));
    assert!(mocker.register_generator(
        "book",
        from_fn(|ctx, _rng| {
            if ctx.kind() != Kind::Struct {
                return Err(GenerationError::Unsupported("only structs".to_string()));
            }
            Ok(Value::opaque(Book {
                id: 555,
                name: "test book".to_string(),
            }))
        }),
    ));
    assert!(mocker.register_generator(
        "ids",
        from_fn(|_ctx, _rng| {
            Ok(Value::List(
                [101, 201, 301, 999].into_iter().map(Value::Int).collect(),
            ))
        }),
    ));
    mocker
}

fn assert_hobby(hobby: &Hobby) {
    assert_eq!(hobby.id, 5);
    assert!((1..=3).contains(&hobby.ht.0), "ht {:?}", hobby.ht);
    assert!((4..=23).contains(&hobby.name.len()), "name {}", hobby.name);
    assert!(hobby.name.chars().all(|ch| ch.is_ascii_alphanumeric()));
    assert!((1..=5).contains(&hobby.pros.len()));
    for pro in &hobby.pros {
        assert!((3..=6).contains(&pro.len()), "pro {pro}");
    }
}

#[test]
fn fills_every_tagged_field() {
    init_tracing();
    let mocker = mocker_with_custom_generators();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut man = Man {
        untagged: 7,
        ..Man::default()
    };

    mocker
        .generate_into_with_rng(&mut man, &Context::background(), &mut rng)
        .expect("generate");

    assert_eq!(man.id, 5);
    assert_eq!(man.ids, vec![101, 201, 301, 999]);
    assert_eq!(man.name, "李明");
    assert!(man.age.expect("age allocated") >= 23);
    assert_hobby(man.hobby.as_ref().expect("hobby allocated"));
    assert_eq!(man.hobbies.len(), 1);
    assert_hobby(man.hobbies[0].as_ref().expect("element allocated"));
    assert_eq!(
        man.books,
        vec![Book {
            id: 555,
            name: "test book".to_string()
        }]
    );
    assert!([2, 3, 4, 5].contains(&man.option));
    assert!(man.decimal >= -23.235 && man.decimal <= 5.58, "decimal {}", man.decimal);
    assert_eq!(man.untagged, 7);

    let phone = man.mobile_phone.as_deref().expect("phone");
    assert_eq!(phone.len(), 11);
    assert!(phone.chars().all(|ch| ch.is_ascii_digit()));
    assert!(MOBILE_PHONE_PREFIXES.iter().any(|prefix| phone.starts_with(prefix)));

    let email = man.email.as_deref().expect("email");
    let email_shape = Regex::new(r"^[a-zA-Z0-9]{7,12}@[a-z0-9]+\.com$").expect("regex");
    assert!(email_shape.is_match(email), "email {email}");

    let address = man.address.as_deref().expect("address");
    let parts: Vec<&str> = address.split(' ').collect();
    assert_eq!(parts.len(), 2, "address {address}");
    let city = AREAS
        .iter()
        .flat_map(|province| province.cities.iter())
        .find(|city| city.name == parts[0])
        .expect("known city");
    assert!(city.counties.contains(&parts[1]));

    assert!(man.create_time.expect("create time") > 1_600_000_000_000);
    let stamp = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("regex");
    assert!(stamp.is_match(man.update_time.as_deref().expect("update time")));

    assert!(man.reg_decimal >= 111.0 && man.reg_decimal < 1000.0);
    assert!(man.reg_name.chars().count() >= 6);
    assert!(man.reg_name.chars().all(|ch| ('\u{4e00}'..='\u{9fa5}').contains(&ch)));

    let json = serde_json::to_value(&man).expect("serialize");
    assert_eq!(json["id"], 5);
    assert_eq!(json["books"][0]["id"], 555);
}

#[derive(Debug, Default, Mockable)]
struct Human {
    #[tag(mock = "eq=1,into=1,key=book")]
    books: Vec<Book>,
}

#[test]
fn generators_read_context_values() {
    let mocker = Mocker::new();
    mocker.register_generator(
        "book",
        from_fn(|ctx, _rng| {
            let book = ctx.value::<Book>().cloned().unwrap_or_default();
            Ok(Value::opaque(book))
        }),
    );
    let context = Context::background().with_value(Book {
        id: 777,
        name: "from context".to_string(),
    });

    let mut human = Human::default();
    mocker
        .generate_into_ctx(&mut human, &context)
        .expect("generate");

    assert_eq!(human.books.len(), 1);
    assert_eq!(human.books[0].id, 777);
    assert_eq!(human.books[0].name, "from context");
}

#[test]
fn pointer_targets_are_filled_through_the_pointer() {
    let mocker = Mocker::new();
    let mut boxed = Box::new(Book::default());
    mocker.generate_into(&mut boxed).expect("generate");
    assert_eq!(boxed.id, 5);

    let mut optional = Some(Book::default());
    mocker.generate_into(&mut optional).expect("generate");
    assert_eq!(optional.expect("still present").id, 5);
    assert_eq!(mocker.cached_schemas(), 1);
}

#[derive(Debug, Default, Mockable)]
struct Catalogue {
    #[tag(mock = "key=shelf")]
    shelf: Vec<Book>,
    #[tag(mock = "key=ids,into,eq=3")]
    codes: Vec<u16>,
}

#[test]
fn opaque_sequences_replace_the_whole_value() {
    let mocker = mocker_with_custom_generators();
    mocker.register_generator(
        "shelf",
        from_fn(|_ctx, _rng| {
            Ok(Value::opaque(vec![
                Book {
                    id: 1,
                    name: "one".to_string(),
                },
                Book {
                    id: 2,
                    name: "two".to_string(),
                },
            ]))
        }),
    );
    let mut catalogue = Catalogue::default();
    mocker.generate_into(&mut catalogue).expect("generate");
    assert_eq!(catalogue.shelf.iter().map(|book| book.id).collect::<Vec<_>>(), vec![1, 2]);
    // the element schema runs over every element the list produced
    assert_eq!(catalogue.codes, vec![3, 3, 3, 3]);
}
