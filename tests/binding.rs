use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use dragon_bind::bridge::{FieldConverter, SerdeConverter, Token, TokenReader};
use dragon_bind::reflect::{
    ObjectBuilder, PrimitiveConverter, ReadOnlyCollection, ReadOnlyDictionary, ReadOnlyList,
    Reflect, TypeInfo, TypeRef,
};
use dragon_bind::{
    bind, bind_key, bind_with_options, BindError, Binder, BinderOptions, Config, ConfigSection,
    Error,
};
use serde::Deserialize;
use tempfile::NamedTempFile;

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: String,
    age: i32,
}

impl Reflect for Person {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .field("name", |p| &mut p.name)
            .field("age", |p| &mut p.age)
            .build_default()
    }
}

fn section(toml_str: &str) -> ConfigSection {
    ConfigSection::from_table(&toml::from_str(toml_str).unwrap())
}

#[test]
fn test_plain_object_from_leaves() {
    let root = ConfigSection::from_entries([("name", "Ada"), ("age", "37")]);
    let mut person = Person::default();
    bind(&root, &mut person).unwrap();
    assert_eq!(
        person,
        Person {
            name: "Ada".into(),
            age: 37
        }
    );
}

#[test]
fn test_scalars_replace_existing_values() {
    let root = ConfigSection::from_entries([("name", "Grace"), ("age", "85")]);
    let mut person = Person {
        name: "Ada".into(),
        age: 37,
    };
    bind(&root, &mut person).unwrap();
    assert_eq!(person.name, "Grace");
    assert_eq!(person.age, 85);
}

#[test]
fn test_flattened_object_round_trips() {
    let original = Person {
        name: "Linus".into(),
        age: 54,
    };
    let root = ConfigSection::from_entries([
        ("name", original.name.clone()),
        ("age", original.age.to_string()),
    ]);
    let mut bound = Person::default();
    bind(&root, &mut bound).unwrap();
    assert_eq!(bound, original);
}

#[test]
fn test_array_is_extended() {
    let root = section("values = [3, 4]");
    let mut values: Box<[i32]> = vec![1, 2].into_boxed_slice();
    bind_key(&root, "values", &mut values).unwrap();
    assert_eq!(&*values, &[1, 2, 3, 4]);
}

#[test]
fn test_failed_array_element_defaults_and_is_reported() {
    let root = section(r#"values = ["2", "x", "4"]"#);
    let mut values: Box<[u8]> = vec![1].into_boxed_slice();
    let report = bind_key(&root, "values", &mut values).unwrap();

    assert_eq!(&*values, &[1, 2, 0, 4]);
    assert!(!report.is_complete());
    let skipped = report.skipped();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].index, 1);
    assert_eq!(skipped[0].path, "values.1");
    assert!(matches!(skipped[0].error, BindError::Conversion { .. }));
}

#[test]
fn test_dictionary_rebind_overwrites_present_keys() {
    let mut map: HashMap<String, i32> = HashMap::new();
    bind(&section("a = 1\nb = 2"), &mut map).unwrap();
    assert_eq!(map, HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]));

    bind(&section("a = 9"), &mut map).unwrap();
    assert_eq!(map, HashMap::from([("a".to_string(), 9), ("b".to_string(), 2)]));
}

#[test]
fn test_dictionary_keys_keep_their_case() {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    bind(&section("Alpha = \"x\"\nbeta = \"y\""), &mut map).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), ["Alpha", "beta"]);
}

#[test]
fn test_later_duplicate_key_wins() {
    let root = ConfigSection::from_entries([("key", "first"), ("KEY", "second")]);
    let mut map: HashMap<String, String> = HashMap::new();
    bind(&root, &mut map).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["key"], "second");
}

#[test]
fn test_abstract_list_is_synthesized() {
    let root = section(r#"items = ["x", "y"]"#);
    let (list, report) = Binder::default()
        .create::<Box<dyn ReadOnlyList<String>>>(&root.section("items"))
        .unwrap();
    assert!(report.is_complete());

    let list = list.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.get(0).map(String::as_str), Some("x"));
    assert_eq!(list.get(1).map(String::as_str), Some("y"));
}

trait Plugin {
    fn name(&self) -> &str;
}

impl Reflect for Box<dyn Plugin> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>().abstract_type()
    }
}

#[test]
fn test_abstract_type_without_capability_is_fatal() {
    let root = ConfigSection::from_entries([("plugin.name", "audit")]);
    let error = Binder::default()
        .create::<Box<dyn Plugin>>(&root.section("plugin"))
        .map(|(plugin, _)| plugin.map(|p| p.name().to_string()))
        .unwrap_err();
    assert!(matches!(error, BindError::AbstractType { .. }));
}

struct Handle {
    id: u32,
}

impl Reflect for Handle {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .field("id", |h| &mut h.id)
            .build()
    }
}

#[derive(Default)]
struct Owner {
    handle: Option<Handle>,
}

impl Reflect for Owner {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .field("handle", |o| &mut o.handle)
            .build_default()
    }
}

#[test]
fn test_type_without_constructor_is_fatal() {
    let root = ConfigSection::from_entries([("handle.id", "1")]);
    let mut owner = Owner::default();
    let error = bind(&root, &mut owner).unwrap_err();
    assert!(matches!(error, BindError::MissingConstructor { .. }));

    owner.handle = Some(Handle { id: 0 });
    bind(&root, &mut owner).unwrap();
    assert_eq!(owner.handle.map(|h| h.id), Some(1));
}

#[derive(Default)]
struct Limits {
    timeout: Option<u32>,
    tags: Option<Box<dyn ReadOnlyList<String>>>,
    labels: Option<Box<dyn ReadOnlyDictionary<String, String>>>,
}

impl Reflect for Limits {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .field("timeout", |l| &mut l.timeout)
            .field("tags", |l| &mut l.tags)
            .field("labels", |l| &mut l.labels)
            .build_default()
    }
}

#[test]
fn test_empty_nullable_leaf_keeps_value() {
    let mut limits = Limits {
        timeout: Some(30),
        ..Limits::default()
    };
    bind(&section("timeout = \"\""), &mut limits).unwrap();
    assert_eq!(limits.timeout, Some(30));

    bind(&section("timeout = 45"), &mut limits).unwrap();
    assert_eq!(limits.timeout, Some(45));
}

#[test]
fn test_abstract_members_get_surrogates() {
    let root = section(
        r#"
        tags = ["a", "b"]

        [labels]
        team = "core"
        "#,
    );
    let mut limits = Limits::default();
    bind(&root, &mut limits).unwrap();

    let tags = limits.tags.unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags.get(1).map(String::as_str), Some("b"));

    let labels = limits.labels.unwrap();
    assert_eq!(labels.get(&"team".to_string()).map(String::as_str), Some("core"));
}

dragon_bind::config_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Level {
        Debug,
        Info,
        Warn,
    }
}

#[test]
fn test_enum_scalars_ignore_case() {
    let mut level = Level::Debug;
    bind_key(&section("level = \"WARN\""), "level", &mut level).unwrap();
    assert_eq!(level, Level::Warn);
}

#[test]
fn test_enum_dictionary_keys() {
    let mut map: BTreeMap<Level, u8> = BTreeMap::new();
    bind(&section("Info = 1\nWarn = 2"), &mut map).unwrap();
    assert_eq!(map, BTreeMap::from([(Level::Info, 1u8), (Level::Warn, 2u8)]));

    let error = bind(&section("Verbose = 3"), &mut map).unwrap_err();
    assert!(matches!(
        error,
        BindError::InvalidEnumKey { ref key, .. } if key == "Verbose"
    ));
}

#[test]
fn test_enum_key_is_only_parsed_for_bound_values() {
    let mut map: BTreeMap<Level, Option<u8>> = BTreeMap::new();
    bind(&section("Info = \"4\"\nVerbose = \"\""), &mut map).unwrap();
    assert_eq!(map, BTreeMap::from([(Level::Info, Some(4u8))]));

    let error = bind(&section("Verbose = \"5\""), &mut map).unwrap_err();
    assert!(matches!(error, BindError::InvalidEnumKey { .. }));
}

#[test]
fn test_unsupported_dictionary_key_is_left_unbound() {
    let mut map: HashMap<u16, String> = HashMap::new();
    let report = bind(&section("1 = \"one\""), &mut map).unwrap();
    assert!(map.is_empty());
    assert!(report.is_complete());
}

#[derive(Default)]
struct Entity {
    id: u64,
    created_by: String,
}

impl Reflect for Entity {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .field("id", |e| &mut e.id)
            .field("created_by", |e| &mut e.created_by)
            .build_default()
    }
}

#[derive(Default)]
struct Account {
    entity: Entity,
    email: String,
    password: String,
    balance: i64,
    audit: Person,
    cache_key: String,
    slots: Vec<String>,
}

impl Reflect for Account {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .field("email", |a| &mut a.email)
            .field("password", |a| &mut a.password)
            .non_public()
            .field("balance", |a| &mut a.balance)
            .non_public_setter()
            .field("audit", |a| &mut a.audit)
            .non_public_setter()
            .field("cache_key", |a| &mut a.cache_key)
            .write_only()
            .field("slots", |a| &mut a.slots)
            .indexed()
            .base(|a| &mut a.entity)
            .build_default()
    }
}

fn account_section() -> ConfigSection {
    section(
        r#"
        id = 7
        created_by = "admin"
        email = "ada@example.com"
        password = "hunter2"
        balance = 100
        cache_key = "k"
        slots = ["s"]

        [audit]
        name = "auditor"
        "#,
    )
}

#[test]
fn test_inherited_members_are_bound() {
    let mut account = Account::default();
    bind(&account_section(), &mut account).unwrap();
    assert_eq!(account.entity.id, 7);
    assert_eq!(account.entity.created_by, "admin");
    assert_eq!(account.email, "ada@example.com");
}

#[test]
fn test_member_visibility_rules() {
    let mut account = Account::default();
    bind(&account_section(), &mut account).unwrap();
    assert_eq!(account.password, "");
    assert_eq!(account.balance, 0);
    assert_eq!(account.audit.name, "auditor");
    assert_eq!(account.cache_key, "");
    assert!(account.slots.is_empty());

    let mut account = Account::default();
    let options = BinderOptions::new().with_non_public_members(true);
    bind_with_options(&account_section(), &mut account, options).unwrap();
    assert_eq!(account.password, "hunter2");
    assert_eq!(account.balance, 100);
    assert_eq!(account.cache_key, "");
    assert!(account.slots.is_empty());
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Rgb(u8, u8, u8);

impl Reflect for Rgb {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>().constructible::<Self>()
    }
}

/// Reads `#rrggbb` strings.
#[derive(Default)]
struct HexColor;

impl FieldConverter for HexColor {
    type Value = Rgb;

    fn read_value(
        &self,
        reader: &mut TokenReader,
        hint: TypeRef,
        _existing: Option<&Rgb>,
        primitives: &PrimitiveConverter,
    ) -> Result<Option<Rgb>, BindError> {
        assert!(hint.is::<Rgb>());
        let Some(text) = reader.text() else {
            return Ok(None);
        };
        let hex = text
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6)
            .ok_or_else(|| BindError::converter(format!("'{text}' is not a color")))?;
        let channel = |at: usize| {
            primitives
                .convert::<String>(&hex[at..at + 2])
                .and_then(|s| u8::from_str_radix(&s, 16).map_err(|e| e.to_string()))
                .map_err(BindError::converter)
        };
        Ok(Some(Rgb(channel(0)?, channel(2)?, channel(4)?)))
    }
}

/// Adds the configured amount to the current value.
#[derive(Default)]
struct Increment;

impl FieldConverter for Increment {
    type Value = u32;

    fn read_value(
        &self,
        reader: &mut TokenReader,
        _hint: TypeRef,
        existing: Option<&u32>,
        primitives: &PrimitiveConverter,
    ) -> Result<Option<u32>, BindError> {
        let Some(Token::Value(Some(text))) = reader.current() else {
            return Ok(None);
        };
        let step = primitives.convert::<u32>(text).map_err(BindError::converter)?;
        Ok(Some(existing.copied().unwrap_or_default() + step))
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Retry {
    attempts: u8,
    backoff_ms: Option<u64>,
}

impl Reflect for Retry {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>().constructible::<Self>()
    }
}

#[derive(Default)]
struct Theme {
    accent: Rgb,
    counter: u32,
    retry: Retry,
}

impl Reflect for Theme {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .converted::<HexColor>("accent", |t| &mut t.accent)
            .converted::<Increment>("counter", |t| &mut t.counter)
            .converted::<SerdeConverter<Retry>>("retry", |t| &mut t.retry)
            .build_default()
    }
}

#[test]
fn test_converter_reads_scalar_member() {
    let mut theme = Theme::default();
    bind(&section("ACCENT = \"#ff8000\""), &mut theme).unwrap();
    assert_eq!(theme.accent, Rgb(0xff, 0x80, 0x00));
}

#[test]
fn test_converter_sees_existing_value() {
    let mut theme = Theme {
        counter: 5,
        ..Theme::default()
    };
    bind(&section("counter = 3"), &mut theme).unwrap();
    assert_eq!(theme.counter, 8);
}

#[test]
fn test_serde_converter_reads_nested_member() {
    let mut theme = Theme::default();
    bind(&section("[retry]\nattempts = 3\nbackoff_ms = 250"), &mut theme).unwrap();
    assert_eq!(
        theme.retry,
        Retry {
            attempts: 3,
            backoff_ms: Some(250)
        }
    );
}

#[test]
fn test_converted_members_keep_value_when_missing() {
    let mut theme = Theme {
        accent: Rgb(1, 2, 3),
        counter: 4,
        retry: Retry {
            attempts: 2,
            backoff_ms: None,
        },
    };
    bind(&ConfigSection::root(), &mut theme).unwrap();
    assert_eq!(theme.accent, Rgb(1, 2, 3));
    assert_eq!(theme.counter, 4);
    assert_eq!(theme.retry.attempts, 2);
}

#[test]
fn test_converter_failure_aborts_bind() {
    let mut theme = Theme::default();
    let error = bind(&section("accent = \"red\""), &mut theme).unwrap_err();
    assert!(matches!(error, BindError::Converter { .. }));
}

#[derive(Default)]
struct Service {
    name: String,
    listen: Option<std::net::SocketAddr>,
    timeout: std::time::Duration,
    raw: ConfigSection,
}

impl Reflect for Service {
    fn type_info() -> TypeInfo {
        ObjectBuilder::<Self>::new()
            .field("name", |s| &mut s.name)
            .field("listen", |s| &mut s.listen)
            .field("timeout", |s| &mut s.timeout)
            .field("raw", |s| &mut s.raw)
            .build_default()
    }
}

#[test]
fn test_config_loads_and_binds() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [service]
        name = "api"
        listen = "127.0.0.1:${{service.port}}"
        port = 8080
        timeout = "00:00:30"

        [service.raw]
        anything = "goes"
        "#
    )
    .unwrap();

    let root = Config::builder().with_file(file.path(), true).build().unwrap();
    let mut service = Service::default();
    bind_key(&root, "service", &mut service).unwrap();

    assert_eq!(service.name, "api");
    assert_eq!(service.listen, Some("127.0.0.1:8080".parse().unwrap()));
    assert_eq!(service.timeout, std::time::Duration::from_secs(30));
    assert_eq!(
        service.raw.get("anything").and_then(ConfigSection::value),
        Some("goes")
    );
}

#[test]
fn test_oversized_duration_is_a_conversion_error() {
    let root = ConfigSection::from_entries([("timeout", "999999999999999999.00:00:00")]);
    let mut service = Service::default();
    let error = bind(&root, &mut service).unwrap_err();
    assert!(matches!(
        error,
        BindError::Conversion { ref path, .. } if path == "timeout"
    ));
    assert_eq!(service.timeout, std::time::Duration::ZERO);
}

#[test]
fn test_config_get_reports_both_error_kinds() {
    let mut bad_toml = NamedTempFile::new().unwrap();
    write!(bad_toml, "name = ").unwrap();
    let error = Config::builder()
        .with_file(bad_toml.path(), true)
        .get::<Person>()
        .unwrap_err();
    assert!(matches!(error, Error::Config(_)));

    let mut bad_age = NamedTempFile::new().unwrap();
    write!(bad_age, "age = \"old\"").unwrap();
    let error = Config::builder()
        .with_file(bad_age.path(), true)
        .get::<Person>()
        .unwrap_err();
    assert!(matches!(error, Error::Bind(BindError::Conversion { .. })));
}
