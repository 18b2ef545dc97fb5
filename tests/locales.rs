use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

rust_i18n::i18n!("locales", fallback = "en");

fn keys(value: &Value, prefix: &str, out: &mut BTreeSet<String>) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let k = k.as_str().unwrap_or_default();
                let path = if prefix.is_empty() {
                    k.to_string()
                } else {
                    format!("{prefix}.{k}")
                };
                keys(v, &path, out);
            }
        }
        _ => {
            out.insert(prefix.to_string());
        }
    }
}

fn load(locale: &str) -> BTreeSet<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("locales")
        .join(format!("{locale}.yml"));
    let text = fs::read_to_string(&path).unwrap();
    let value: Value = serde_yaml::from_str(&text).unwrap();
    let mut out = BTreeSet::new();
    keys(&value, "", &mut out);
    out
}

#[test]
fn locales_define_the_same_keys() {
    let ko = load("ko");
    let en = load("en");
    let only_ko: Vec<_> = ko.difference(&en).collect();
    let only_en: Vec<_> = en.difference(&ko).collect();
    assert!(only_ko.is_empty(), "missing in en: {only_ko:?}");
    assert!(only_en.is_empty(), "missing in ko: {only_en:?}");
}

#[test]
fn korean_is_the_default_wording() {
    rust_i18n::set_locale("ko");
    assert_eq!(rust_i18n::t!("study.correct"), "정답입니다!");
    assert_eq!(
        rust_i18n::t!("study.progress", current = 3, count = 10, percent = 30),
        "문제 3/10 · 30%"
    );
}
