//! Template function registry.
//!
//! Every function here is callable from field templates by name, e.g.
//! `{{ fakeit_Name() }}` or `{{ file_Base64("/tmp/payload.bin") }}`. The
//! registry is built once per worker environment; the only mutable capture
//! is the form-data Content-Type slot used by `body_FormData`.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{Duration as ChronoDuration, Utc};
use fake::faker::address::en::{
    BuildingNumber, CityName, CityPrefix, CitySuffix, CountryCode, CountryName, PostCode,
    SecondaryAddress, StateAbbr, StateName, StreetName, StreetSuffix, TimeZone, ZipCode,
};
use fake::faker::barcode::en::{Isbn, Isbn13};
use fake::faker::boolean::en::Boolean;
use fake::faker::company::en::{
    Bs, BsAdj, BsNoun, BsVerb, Buzzword, BuzzwordMiddle, BuzzwordTail, CompanyName, CompanySuffix,
    Industry, Profession,
};
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::currency::en::{CurrencyCode, CurrencyName, CurrencySymbol};
use fake::faker::filesystem::en::{DirPath, FileExtension, FileName, FilePath, MimeType, Semver};
use fake::faker::internet::en::{
    DomainSuffix, FreeEmailProvider, MACAddress, SafeEmail, UserAgent, Username, IPv4, IPv6, IP,
};
use fake::faker::job::en::{Field as JobField, Position, Seniority, Title as JobTitle};
use fake::faker::lorem::en::{Paragraph, Sentence, Word, Words};
use fake::faker::name::en::{FirstName, LastName, Name, Suffix, Title};
use fake::faker::phone_number::en::{CellNumber, PhoneNumber};
use fake::Fake;
use minijinja::value::{Rest, Value};
use minijinja::{Environment, Error as TemplateError, ErrorKind};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::filecache::FileCache;

/// Side channel between `body_FormData` and the header builder: the
/// generated multipart Content-Type is parked here during body rendering
/// and appended to the headers afterwards.
#[derive(Default)]
pub struct FormDataState {
    content_type: Mutex<Option<String>>,
}

impl FormDataState {
    pub fn clear(&self) {
        *self.content_type.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn get(&self) -> Option<String> {
        self.content_type
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, value: String) {
        *self.content_type.lock().unwrap_or_else(|e| e.into_inner()) = Some(value);
    }
}

fn template_err(msg: impl Into<String>) -> TemplateError {
    TemplateError::new(ErrorKind::InvalidOperation, msg.into())
}

fn pick(list: &[&str]) -> String {
    let mut rng = rand::rng();
    (*list.choose(&mut rng).unwrap_or(&"")).to_owned()
}

fn numerify(pattern: &str) -> String {
    let mut rng = rand::rng();
    pattern
        .chars()
        .map(|c| {
            if c == '#' {
                char::from_digit(rng.random_range(0..10), 10).unwrap_or('0')
            } else {
                c
            }
        })
        .collect()
}

fn lexify(pattern: &str) -> String {
    let mut rng = rand::rng();
    pattern
        .chars()
        .map(|c| {
            if c == '?' {
                (b'a' + rng.random_range(0..26u8)) as char
            } else {
                c
            }
        })
        .collect()
}

fn random_letters(n: usize) -> String {
    let mut rng = rand::rng();
    (0..n).map(|_| (b'a' + rng.random_range(0..26u8)) as char).collect()
}

fn random_digits(n: usize) -> String {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| char::from_digit(rng.random_range(0..10), 10).unwrap_or('0'))
        .collect()
}

macro_rules! fake_fn {
    ($env:expr, $name:literal, $faker:expr) => {
        $env.add_function($name, move || -> String { $faker.fake() });
    };
}

macro_rules! pick_fn {
    ($env:expr, $name:literal, $list:expr) => {
        $env.add_function($name, move || -> String { pick($list) });
    };
}

/// Registers the shared function set used by path, method, header, param,
/// cookie and values templates.
pub fn register_functions(env: &mut Environment<'static>, cache: Arc<FileCache>) {
    register_string_helpers(env);
    register_collection_helpers(env);
    register_fakeit(env);

    env.add_function(
        "file_Base64",
        move |source: String| -> Result<String, TemplateError> {
            let file = cache
                .get_or_load(&source)
                .map_err(|e| template_err(e.to_string()))?;
            Ok(BASE64.encode(&file.content))
        },
    );
}

/// Registers the body function set: everything from [`register_functions`]
/// plus `body_FormData`, which emits a multipart payload and parks its
/// Content-Type in `state`.
pub fn register_body_functions(
    env: &mut Environment<'static>,
    cache: Arc<FileCache>,
    state: Arc<FormDataState>,
) {
    register_functions(env, Arc::clone(&cache));

    env.add_function(
        "body_FormData",
        move |pairs: Rest<String>| -> Result<String, TemplateError> {
            let pairs = pairs.0;
            if pairs.len() % 2 != 0 {
                return Err(template_err(
                    "body_FormData requires an even number of arguments (key-value pairs)",
                ));
            }

            let boundary = format!(
                "{:016x}{:016x}",
                rand::random::<u64>(),
                rand::random::<u64>()
            );
            let mut body = String::new();

            for pair in pairs.chunks(2) {
                let (key, value) = (&pair[0], &pair[1]);
                if let Some(rest) = value.strip_prefix("@@") {
                    // Escaped leading @: send a literal value without the first @.
                    write_text_part(&mut body, &boundary, key, &format!("@{rest}"));
                } else if let Some(source) = value.strip_prefix('@') {
                    let file = cache
                        .get_or_load(source)
                        .map_err(|e| template_err(e.to_string()))?;
                    body.push_str(&format!(
                        "--{boundary}\r\nContent-Disposition: form-data; name=\"{key}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        file.filename
                    ));
                    body.push_str(&String::from_utf8_lossy(&file.content));
                    body.push_str("\r\n");
                } else {
                    write_text_part(&mut body, &boundary, key, value);
                }
            }

            body.push_str(&format!("--{boundary}--\r\n"));
            state.set(format!("multipart/form-data; boundary={boundary}"));
            Ok(body)
        },
    );
}

fn write_text_part(body: &mut String, boundary: &str, key: &str, value: &str) {
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{key}\"\r\n\r\n{value}\r\n"
    ));
}

fn register_string_helpers(env: &mut Environment<'static>) {
    env.add_function("strings_ToUpper", |s: String| s.to_uppercase());
    env.add_function("strings_ToLower", |s: String| s.to_lowercase());
    env.add_function("strings_RemoveSpaces", |s: String| s.replace(' ', ""));
    env.add_function(
        "strings_Replace",
        |s: String, old: String, new: String, n: i64| -> String {
            if n < 0 {
                s.replace(&old, &new)
            } else {
                s.replacen(&old, &new, n as usize)
            }
        },
    );
    env.add_function("strings_First", |s: String, n: i64| -> String {
        if n <= 0 {
            return String::new();
        }
        s.chars().take(n as usize).collect()
    });
    env.add_function("strings_Last", |s: String, n: i64| -> String {
        if n <= 0 {
            return String::new();
        }
        let chars: Vec<char> = s.chars().collect();
        let start = chars.len().saturating_sub(n as usize);
        chars[start..].iter().collect()
    });
    env.add_function("strings_Truncate", |s: String, n: i64| -> String {
        if n <= 0 {
            return "...".to_owned();
        }
        let chars: Vec<char> = s.chars().collect();
        if n as usize >= chars.len() {
            return s;
        }
        let mut out: String = chars[..n as usize].iter().collect();
        out.push_str("...");
        out
    });
    env.add_function("strings_TrimPrefix", |s: String, prefix: String| -> String {
        s.strip_prefix(&prefix).unwrap_or(&s).to_owned()
    });
    env.add_function("strings_TrimSuffix", |s: String, suffix: String| -> String {
        s.strip_suffix(&suffix).unwrap_or(&s).to_owned()
    });
    env.add_function("strings_ToDate", |s: String| -> String {
        match chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(date) => date.to_string(),
            Err(_) => Utc::now().date_naive().to_string(),
        }
    });
}

fn register_collection_helpers(env: &mut Environment<'static>) {
    env.add_function("dict_Str", |values: Rest<String>| -> Value {
        let mut map = std::collections::BTreeMap::new();
        for pair in values.0.chunks(2) {
            if pair.len() == 2 {
                map.insert(pair[0].clone(), pair[1].clone());
            }
        }
        Value::from_serialize(&map)
    });
    env.add_function("slice_Str", |values: Rest<String>| -> Value {
        Value::from_serialize(&values.0)
    });
    env.add_function("slice_Int", |values: Rest<i64>| -> Value {
        Value::from_serialize(&values.0)
    });
    env.add_function("slice_Uint", |values: Rest<u64>| -> Value {
        Value::from_serialize(&values.0)
    });
    env.add_function("slice_Join", |values: Vec<String>, sep: String| -> String {
        values.join(&sep)
    });
}

fn register_fakeit(env: &mut Environment<'static>) {
    register_fakeit_grammar(env);
    register_fakeit_products(env);
    register_fakeit_food_drink(env);
    register_fakeit_vehicles(env);
    register_fakeit_media(env);
    register_fakeit_emoji(env);
    register_fakeit_hacker_hipster(env);
    register_fakeit_errors(env);
    register_fakeit_internet_extra(env);
    register_fakeit_time_extra(env);
    register_fakeit_finance_extra(env);
    register_fakeit_misc_extra(env);
    register_fakeit_formats(env);
    register_fakeit_composites(env);

    // IDs
    env.add_function("fakeit_UUID", || -> String {
        uuid::Uuid::new_v4().to_string()
    });
    env.add_function("fakeit_ID", || -> String { random_letters(8) + &random_digits(8) });

    // Person
    fake_fn!(env, "fakeit_Name", Name());
    fake_fn!(env, "fakeit_FirstName", FirstName());
    fake_fn!(env, "fakeit_LastName", LastName());
    fake_fn!(env, "fakeit_NamePrefix", Title());
    fake_fn!(env, "fakeit_NameSuffix", Suffix());
    env.add_function("fakeit_MiddleName", || -> String { FirstName().fake() });
    pick_fn!(env, "fakeit_Gender", &["male", "female"]);
    env.add_function("fakeit_Age", || -> i64 {
        rand::rng().random_range(1..=100)
    });
    env.add_function("fakeit_SSN", || numerify("###-##-####"));
    env.add_function("fakeit_EIN", || numerify("##-#######"));
    pick_fn!(
        env,
        "fakeit_Hobby",
        &["reading", "chess", "cycling", "photography", "cooking", "gardening", "climbing", "painting"]
    );

    // Contact
    fake_fn!(env, "fakeit_Email", SafeEmail());
    fake_fn!(env, "fakeit_Phone", PhoneNumber());
    fake_fn!(env, "fakeit_PhoneFormatted", CellNumber());

    // Auth
    fake_fn!(env, "fakeit_Username", Username());
    // fakeit_Password(lower, upper, numeric, special, space, length)
    env.add_function("fakeit_Password", |args: Rest<Value>| -> String {
        let flag = |index: usize| args.0.get(index).map(Value::is_true).unwrap_or(false);
        let mut alphabet = String::new();
        if flag(0) {
            alphabet.push_str("abcdefghijklmnopqrstuvwxyz");
        }
        if flag(1) {
            alphabet.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        }
        if flag(2) {
            alphabet.push_str("0123456789");
        }
        if flag(3) {
            alphabet.push_str("!@#$%&*+-_?");
        }
        if flag(4) {
            alphabet.push(' ');
        }
        if alphabet.is_empty() {
            alphabet.push_str("abcdefghijklmnopqrstuvwxyz");
        }
        let length = args
            .0
            .get(5)
            .and_then(|v| i64::try_from(v.clone()).ok())
            .unwrap_or(12)
            .max(1) as usize;
        let chars: Vec<char> = alphabet.chars().collect();
        let mut rng = rand::rng();
        (0..length)
            .map(|_| chars[rng.random_range(0..chars.len())])
            .collect()
    });

    // Address
    fake_fn!(env, "fakeit_City", CityName());
    fake_fn!(env, "fakeit_Country", CountryName());
    fake_fn!(env, "fakeit_CountryAbr", CountryCode());
    fake_fn!(env, "fakeit_State", StateName());
    fake_fn!(env, "fakeit_StateAbr", StateAbbr());
    env.add_function("fakeit_Street", || -> String {
        format!(
            "{} {}",
            BuildingNumber().fake::<String>(),
            StreetName().fake::<String>()
        )
    });
    fake_fn!(env, "fakeit_StreetName", StreetName());
    fake_fn!(env, "fakeit_StreetNumber", BuildingNumber());
    pick_fn!(env, "fakeit_StreetPrefix", &["North", "South", "East", "West", "Lake", "New", "Old", "Port"]);
    fake_fn!(env, "fakeit_StreetSuffix", StreetSuffix());
    fake_fn!(env, "fakeit_Unit", SecondaryAddress());
    fake_fn!(env, "fakeit_Zip", ZipCode());
    fake_fn!(env, "fakeit_PostCode", PostCode());
    fake_fn!(env, "fakeit_CityPrefix", CityPrefix());
    fake_fn!(env, "fakeit_CitySuffix", CitySuffix());
    env.add_function("fakeit_Latitude", || -> f64 {
        rand::rng().random_range(-90.0..90.0)
    });
    env.add_function("fakeit_LatitudeInRange", |min: f64, max: f64| -> f64 {
        if min >= max {
            return 0.0;
        }
        rand::rng().random_range(min..max)
    });
    env.add_function("fakeit_Longitude", || -> f64 {
        rand::rng().random_range(-180.0..180.0)
    });
    env.add_function("fakeit_LongitudeInRange", |min: f64, max: f64| -> f64 {
        if min >= max {
            return 0.0;
        }
        rand::rng().random_range(min..max)
    });
    fake_fn!(env, "fakeit_TimeZone", TimeZone());
    fake_fn!(env, "fakeit_TimeZoneRegion", TimeZone());

    // Internet
    env.add_function("fakeit_URL", || -> String {
        format!(
            "https://www.{}.{}/{}",
            Word().fake::<String>().to_lowercase(),
            DomainSuffix().fake::<String>(),
            Word().fake::<String>().to_lowercase()
        )
    });
    env.add_function("fakeit_UrlSlug", || -> String {
        Words(2..4).fake::<Vec<String>>().join("-").to_lowercase()
    });
    env.add_function("fakeit_DomainName", || -> String {
        format!(
            "{}.{}",
            Word().fake::<String>().to_lowercase(),
            DomainSuffix().fake::<String>()
        )
    });
    fake_fn!(env, "fakeit_DomainSuffix", DomainSuffix());
    fake_fn!(env, "fakeit_IPv4Address", IPv4());
    fake_fn!(env, "fakeit_IPv6Address", IPv6());
    fake_fn!(env, "fakeit_IPAddress", IP());
    fake_fn!(env, "fakeit_MacAddress", MACAddress());
    fake_fn!(env, "fakeit_EmailProvider", FreeEmailProvider());
    env.add_function("fakeit_HTTPStatusCode", || -> i64 {
        const CODES: [i64; 14] = [200, 201, 202, 204, 301, 302, 304, 400, 401, 403, 404, 429, 500, 503];
        let mut rng = rand::rng();
        CODES[rng.random_range(0..CODES.len())]
    });
    env.add_function("fakeit_HTTPStatusCodeSimple", || -> i64 {
        const CODES: [i64; 5] = [200, 301, 400, 404, 500];
        let mut rng = rand::rng();
        CODES[rng.random_range(0..CODES.len())]
    });
    pick_fn!(env, "fakeit_HTTPMethod", &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"]);
    pick_fn!(env, "fakeit_HTTPVersion", &["HTTP/1.0", "HTTP/1.1", "HTTP/2.0"]);
    pick_fn!(env, "fakeit_LogLevel", &["trace", "debug", "info", "warning", "error", "fatal"]);
    fake_fn!(env, "fakeit_UserAgent", UserAgent());

    // Words
    pick_fn!(env, "fakeit_Noun", &["time", "way", "year", "work", "world", "life", "hand", "part", "place", "case"]);
    pick_fn!(env, "fakeit_NounCommon", &["area", "book", "business", "group", "problem", "fact", "point", "company"]);
    pick_fn!(env, "fakeit_NounConcrete", &["apple", "bridge", "chair", "door", "engine", "flower", "glass", "house"]);
    pick_fn!(env, "fakeit_NounAbstract", &["anger", "beauty", "courage", "faith", "freedom", "truth", "wisdom", "wealth"]);
    pick_fn!(env, "fakeit_Verb", &["be", "have", "do", "say", "get", "make", "go", "know", "take", "see"]);
    pick_fn!(env, "fakeit_VerbAction", &["run", "jump", "write", "build", "carry", "throw", "draw", "drive"]);
    pick_fn!(env, "fakeit_VerbLinking", &["am", "is", "are", "was", "were", "been", "being", "seem"]);
    pick_fn!(env, "fakeit_VerbHelping", &["can", "could", "may", "might", "must", "shall", "should", "will"]);
    pick_fn!(env, "fakeit_Adverb", &["quickly", "slowly", "quietly", "loudly", "easily", "rarely", "always", "never"]);
    pick_fn!(env, "fakeit_Adjective", &["quick", "bright", "calm", "eager", "fancy", "gentle", "happy", "jolly"]);
    pick_fn!(env, "fakeit_Preposition", &["above", "below", "between", "into", "through", "under", "with", "without"]);
    pick_fn!(env, "fakeit_Pronoun", &["I", "you", "he", "she", "it", "we", "they", "them"]);
    pick_fn!(env, "fakeit_Connective", &["and", "but", "or", "so", "because", "although", "while", "however"]);
    fake_fn!(env, "fakeit_Word", Word());

    // Text
    env.add_function("fakeit_Sentence", |words: i64| -> String {
        let n = words.max(1) as usize;
        Sentence(n..n + 1).fake()
    });
    env.add_function("fakeit_Paragraph", |sentences: i64| -> String {
        let n = sentences.max(1) as usize;
        Paragraph(n..n + 1).fake()
    });
    fake_fn!(env, "fakeit_LoremIpsumWord", Word());
    env.add_function("fakeit_LoremIpsumSentence", |words: i64| -> String {
        let n = words.max(1) as usize;
        Sentence(n..n + 1).fake()
    });
    env.add_function("fakeit_LoremIpsumParagraph", |sentences: i64| -> String {
        let n = sentences.max(1) as usize;
        Paragraph(n..n + 1).fake()
    });
    env.add_function("fakeit_Question", || -> String {
        let s: String = Sentence(4..9).fake();
        format!("{}?", s.trim_end_matches('.'))
    });
    env.add_function("fakeit_Quote", || -> String {
        format!("\"{}\"", Sentence(4..9).fake::<String>())
    });
    env.add_function("fakeit_Phrase", || -> String {
        format!(
            "{} {} {}",
            BsVerb().fake::<String>(),
            BsAdj().fake::<String>(),
            BsNoun().fake::<String>()
        )
    });

    // Company
    fake_fn!(env, "fakeit_Company", CompanyName());
    fake_fn!(env, "fakeit_CompanySuffix", CompanySuffix());
    fake_fn!(env, "fakeit_BS", Bs());
    fake_fn!(env, "fakeit_BSVerb", BsVerb());
    fake_fn!(env, "fakeit_BSAdjective", BsAdj());
    fake_fn!(env, "fakeit_BSNoun", BsNoun());
    fake_fn!(env, "fakeit_BuzzWord", Buzzword());
    fake_fn!(env, "fakeit_BuzzWordMiddle", BuzzwordMiddle());
    fake_fn!(env, "fakeit_BuzzWordTail", BuzzwordTail());
    env.add_function("fakeit_Blurb", || -> String {
        format!(
            "{} {}",
            BuzzwordMiddle().fake::<String>(),
            BsNoun().fake::<String>()
        )
    });
    env.add_function("fakeit_Slogan", || -> String {
        format!(
            "{} {} {}",
            Buzzword().fake::<String>(),
            BuzzwordMiddle().fake::<String>(),
            BuzzwordTail().fake::<String>()
        )
    });
    fake_fn!(env, "fakeit_Industry", Industry());
    fake_fn!(env, "fakeit_Profession", Profession());
    fake_fn!(env, "fakeit_JobTitle", JobTitle());
    fake_fn!(env, "fakeit_JobDescriptor", Seniority());
    fake_fn!(env, "fakeit_JobLevel", JobField());
    fake_fn!(env, "fakeit_JobPosition", Position());

    // Payment
    env.add_function("fakeit_Price", |min: f64, max: f64| -> f64 {
        if min >= max {
            return min;
        }
        (rand::rng().random_range(min..max) * 100.0).round() / 100.0
    });
    env.add_function("fakeit_CreditCardNumber", |gaps: bool| -> String {
        let number: String = CreditCardNumber().fake();
        if !gaps {
            return number;
        }
        number
            .as_bytes()
            .chunks(4)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    });
    env.add_function("fakeit_CreditCardCvv", || random_digits(3));
    env.add_function("fakeit_CreditCardExp", || -> String {
        let mut rng = rand::rng();
        format!("{:02}/{:02}", rng.random_range(1..=12), rng.random_range(26..=32))
    });
    pick_fn!(env, "fakeit_CreditCardType", &["Visa", "MasterCard", "American Express", "Discover", "JCB", "UnionPay"]);
    fake_fn!(env, "fakeit_CurrencyLong", CurrencyName());
    fake_fn!(env, "fakeit_CurrencyShort", CurrencyCode());
    fake_fn!(env, "fakeit_CurrencySymbol", CurrencySymbol());
    env.add_function("fakeit_AchRouting", || random_digits(9));
    env.add_function("fakeit_AchAccount", || random_digits(12));
    env.add_function("fakeit_BitcoinAddress", || -> String {
        const ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
        let mut rng = rand::rng();
        let len = rng.random_range(25..=34);
        let mut out = String::from("1");
        for _ in 0..len {
            out.push(ALPHABET[rng.random_range(0..ALPHABET.len())] as char);
        }
        out
    });
    pick_fn!(env, "fakeit_BankName", &["First National", "Cornerstone Trust", "Meridian Savings", "Harbor Bank", "Summit Credit Union"]);

    // Finance
    fake_fn!(env, "fakeit_Isbn", Isbn());
    fake_fn!(env, "fakeit_Isbn13", Isbn13());

    // Colors
    pick_fn!(env, "fakeit_Color", &["red", "orange", "yellow", "green", "blue", "indigo", "violet", "black", "white", "gray"]);
    env.add_function("fakeit_HexColor", || -> String {
        format!("#{:06x}", rand::rng().random_range(0..0x1000000u32))
    });
    env.add_function("fakeit_RGBColor", || -> String {
        let mut rng = rand::rng();
        format!(
            "rgb({},{},{})",
            rng.random_range(0..256),
            rng.random_range(0..256),
            rng.random_range(0..256)
        )
    });
    pick_fn!(env, "fakeit_SafeColor", &["black", "maroon", "green", "navy", "olive", "purple", "teal", "silver"]);

    // Files
    fake_fn!(env, "fakeit_FileExtension", FileExtension());
    fake_fn!(env, "fakeit_FileMimeType", MimeType());
    fake_fn!(env, "fakeit_FileName", FileName());
    fake_fn!(env, "fakeit_FilePath", FilePath());
    fake_fn!(env, "fakeit_DirPath", DirPath());

    // App
    env.add_function("fakeit_AppName", || -> String {
        format!(
            "{}{}",
            Buzzword().fake::<String>(),
            BsNoun().fake::<String>()
        )
        .replace(' ', "")
    });
    fake_fn!(env, "fakeit_AppVersion", Semver());
    fake_fn!(env, "fakeit_AppAuthor", Name());

    // Language
    pick_fn!(env, "fakeit_Language", &["English", "Spanish", "French", "German", "Japanese", "Mandarin", "Arabic", "Portuguese"]);
    pick_fn!(env, "fakeit_LanguageAbbreviation", &["en", "es", "fr", "de", "ja", "zh", "ar", "pt"]);
    pick_fn!(env, "fakeit_ProgrammingLanguage", &["Rust", "Go", "Python", "TypeScript", "C", "Java", "Kotlin", "Zig"]);

    // Animals & food
    pick_fn!(env, "fakeit_Animal", &["fox", "owl", "bear", "wolf", "otter", "lynx", "heron", "moose"]);
    pick_fn!(env, "fakeit_Cat", &["Siamese", "Persian", "Bengal", "Sphynx", "Ragdoll", "Maine Coon"]);
    pick_fn!(env, "fakeit_Dog", &["Labrador", "Beagle", "Poodle", "Husky", "Collie", "Terrier"]);
    pick_fn!(env, "fakeit_PetName", &["Max", "Luna", "Charlie", "Bella", "Milo", "Daisy", "Rocky", "Coco"]);
    pick_fn!(env, "fakeit_Fruit", &["apple", "pear", "plum", "mango", "kiwi", "grape", "peach", "cherry"]);
    pick_fn!(env, "fakeit_Vegetable", &["carrot", "potato", "onion", "leek", "pepper", "spinach", "beet", "kale"]);

    // Emoji
    pick_fn!(env, "fakeit_Emoji", &["🦀", "🚀", "🔥", "✨", "🎯", "🌊", "🍀", "⚡"]);

    // Date / time
    env.add_function("fakeit_Date", || -> String {
        let mut rng = rand::rng();
        let offset = ChronoDuration::seconds(rng.random_range(0..=60 * 60 * 24 * 365 * 30));
        (Utc::now() - offset).to_rfc3339()
    });
    env.add_function("fakeit_PastDate", || -> String {
        let mut rng = rand::rng();
        let offset = ChronoDuration::seconds(rng.random_range(1..=60 * 60 * 24 * 365));
        (Utc::now() - offset).to_rfc3339()
    });
    env.add_function("fakeit_FutureDate", || -> String {
        let mut rng = rand::rng();
        let offset = ChronoDuration::seconds(rng.random_range(1..=60 * 60 * 24 * 365));
        (Utc::now() + offset).to_rfc3339()
    });
    env.add_function("fakeit_NanoSecond", || -> i64 {
        rand::rng().random_range(0..1_000_000_000)
    });
    env.add_function("fakeit_Second", || -> i64 { rand::rng().random_range(0..60) });
    env.add_function("fakeit_Minute", || -> i64 { rand::rng().random_range(0..60) });
    env.add_function("fakeit_Hour", || -> i64 { rand::rng().random_range(0..24) });
    env.add_function("fakeit_Day", || -> i64 { rand::rng().random_range(1..=31) });
    env.add_function("fakeit_Month", || -> i64 { rand::rng().random_range(1..=12) });
    pick_fn!(
        env,
        "fakeit_MonthString",
        &["January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November", "December"]
    );
    pick_fn!(env, "fakeit_WeekDay", &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]);
    env.add_function("fakeit_Year", || -> i64 {
        rand::rng().random_range(1900..=2030)
    });
    pick_fn!(env, "fakeit_TimeZoneAbv", &["UTC", "GMT", "EST", "PST", "CET", "JST", "IST", "AEST"]);

    // Numbers
    env.add_function("fakeit_Number", |min: i64, max: i64| -> i64 {
        if min >= max {
            return min;
        }
        rand::rng().random_range(min..=max)
    });
    env.add_function("fakeit_Int", || -> i64 { rand::rng().random::<i64>() });
    env.add_function("fakeit_IntN", |n: i64| -> i64 {
        rand::rng().random_range(0..n.max(1))
    });
    env.add_function("fakeit_Int8", || -> i64 { i64::from(rand::rng().random::<i8>()) });
    env.add_function("fakeit_Int16", || -> i64 { i64::from(rand::rng().random::<i16>()) });
    env.add_function("fakeit_Int32", || -> i64 { i64::from(rand::rng().random::<i32>()) });
    env.add_function("fakeit_Int64", || -> i64 { rand::rng().random::<i64>() });
    env.add_function("fakeit_Uint", || -> u64 { rand::rng().random::<u64>() });
    env.add_function("fakeit_UintN", |n: u64| -> u64 {
        rand::rng().random_range(0..n.max(1))
    });
    env.add_function("fakeit_Uint8", || -> u64 { u64::from(rand::rng().random::<u8>()) });
    env.add_function("fakeit_Uint16", || -> u64 { u64::from(rand::rng().random::<u16>()) });
    env.add_function("fakeit_Uint32", || -> u64 { u64::from(rand::rng().random::<u32>()) });
    env.add_function("fakeit_Uint64", || -> u64 { rand::rng().random::<u64>() });
    env.add_function("fakeit_Float32", || -> f64 { f64::from(rand::rng().random::<f32>()) });
    env.add_function("fakeit_Float32Range", |min: f64, max: f64| -> f64 {
        if min >= max {
            return min;
        }
        rand::rng().random_range(min..max)
    });
    env.add_function("fakeit_Float64", || -> f64 { rand::rng().random::<f64>() });
    env.add_function("fakeit_Float64Range", |min: f64, max: f64| -> f64 {
        if min >= max {
            return min;
        }
        rand::rng().random_range(min..max)
    });
    env.add_function("fakeit_HexUint", |bits: i64| -> String {
        let bits = bits.clamp(1, 64) as u32;
        let value = rand::rng().random::<u64>() & (u64::MAX >> (64 - bits));
        format!("0x{value:x}")
    });
    env.add_function("fakeit_RandomInt", |values: Vec<i64>| -> i64 {
        let mut rng = rand::rng();
        values.choose(&mut rng).copied().unwrap_or(0)
    });
    env.add_function("fakeit_RandomString", |values: Vec<String>| -> String {
        let mut rng = rand::rng();
        values.choose(&mut rng).cloned().unwrap_or_default()
    });

    // String patterns
    env.add_function("fakeit_Digit", || random_digits(1));
    env.add_function("fakeit_DigitN", |n: i64| random_digits(n.max(1) as usize));
    env.add_function("fakeit_Letter", || random_letters(1));
    env.add_function("fakeit_LetterN", |n: i64| random_letters(n.max(1) as usize));
    env.add_function("fakeit_Lexify", |pattern: String| lexify(&pattern));
    env.add_function("fakeit_Numerify", |pattern: String| numerify(&pattern));

    // Misc
    env.add_function("fakeit_Bool", || -> bool { Boolean(50).fake() });
    pick_fn!(env, "fakeit_FlipACoin", &["Heads", "Tails"]);
}

fn register_fakeit_grammar(env: &mut Environment<'static>) {
    // Nouns
    pick_fn!(env, "fakeit_NounCollectivePeople", &["audience", "band", "board", "choir", "class", "committee", "crew", "crowd", "family", "gang", "jury", "panel", "staff", "team", "troupe"]);
    pick_fn!(env, "fakeit_NounCollectiveAnimal", &["colony", "flock", "herd", "litter", "pack", "school", "swarm", "troop"]);
    pick_fn!(env, "fakeit_NounCollectiveThing", &["album", "anthology", "archipelago", "batch", "bouquet", "bundle", "cluster", "fleet", "forest", "galaxy", "orchard", "outfit", "range", "set", "stack"]);
    pick_fn!(env, "fakeit_NounCountable", &["apple", "bottle", "chair", "cup", "dog", "idea", "phone", "river", "table", "window"]);
    pick_fn!(env, "fakeit_NounUncountable", &["advice", "bravery", "curiosity", "equipment", "furniture", "happiness", "information", "knowledge", "luggage", "money", "music", "weather"]);

    // Adverbs
    pick_fn!(env, "fakeit_AdverbManner", &["bravely", "carefully", "cheerfully", "neatly", "quickly", "quietly", "badly", "well"]);
    pick_fn!(env, "fakeit_AdverbDegree", &["absolutely", "almost", "barely", "completely", "deeply", "fairly", "greatly", "hardly", "incredibly"]);
    pick_fn!(env, "fakeit_AdverbPlace", &["above", "away", "downstairs", "everywhere", "here", "inside", "nearby", "outside", "there", "upstairs"]);
    pick_fn!(env, "fakeit_AdverbTimeDefinite", &["now", "then", "today", "tomorrow", "tonight", "yesterday"]);
    pick_fn!(env, "fakeit_AdverbTimeIndefinite", &["already", "early", "eventually", "finally", "formerly", "just", "late", "lately", "next", "previously", "recently", "since", "soon", "still", "yet"]);
    pick_fn!(env, "fakeit_AdverbFrequencyDefinite", &["annually", "daily", "fortnightly", "hourly", "monthly", "nightly", "quarterly", "weekly", "yearly"]);
    pick_fn!(env, "fakeit_AdverbFrequencyIndefinite", &["always", "constantly", "frequently", "generally", "hardly ever", "infrequently", "never", "normally", "occasionally", "often", "rarely", "regularly", "seldom", "sometimes", "usually"]);

    // Prepositions
    pick_fn!(env, "fakeit_PrepositionSimple", &["at", "by", "for", "from", "in", "of", "off", "on", "out", "over", "till", "to", "up", "with"]);
    pick_fn!(env, "fakeit_PrepositionDouble", &["from behind", "from beneath", "into", "onto", "out of", "outside of", "up to", "within", "without"]);
    pick_fn!(env, "fakeit_PrepositionCompound", &["according to", "ahead of", "along with", "apart from", "as for", "because of", "by means of", "in front of", "in spite of", "instead of", "on account of", "out of"]);

    // Adjectives
    pick_fn!(env, "fakeit_AdjectiveDescriptive", &["adorable", "beautiful", "clean", "drab", "elegant", "fancy", "glamorous", "handsome", "magnificent", "old-fashioned", "plain", "quaint", "sparkling", "unsightly"]);
    pick_fn!(env, "fakeit_AdjectiveQuantitative", &["a little", "abundant", "all", "any", "each", "either", "enough", "every", "few", "insufficient", "many", "most", "much", "neither", "numerous", "several", "some", "substantial", "whole"]);
    pick_fn!(env, "fakeit_AdjectiveProper", &["African", "American", "Asian", "British", "European", "French", "German", "Japanese", "Mexican", "Polish", "Swiss"]);
    pick_fn!(env, "fakeit_AdjectiveDemonstrative", &["this", "that", "these", "those"]);
    pick_fn!(env, "fakeit_AdjectivePossessive", &["my", "your", "his", "her", "its", "our", "their"]);
    pick_fn!(env, "fakeit_AdjectiveInterrogative", &["what", "whose", "which"]);
    pick_fn!(env, "fakeit_AdjectiveIndefinite", &["all", "another", "any", "anybody", "each", "either", "few", "many", "nobody", "none", "one", "several", "some", "somebody"]);

    // Pronouns
    pick_fn!(env, "fakeit_PronounPersonal", &["I", "you", "he", "she", "it", "we", "they"]);
    pick_fn!(env, "fakeit_PronounObject", &["me", "you", "him", "her", "it", "us", "them"]);
    pick_fn!(env, "fakeit_PronounPossessive", &["mine", "yours", "his", "hers", "its", "ours", "theirs"]);
    pick_fn!(env, "fakeit_PronounReflective", &["myself", "yourself", "himself", "herself", "itself", "ourselves", "themselves"]);
    pick_fn!(env, "fakeit_PronounDemonstrative", &["this", "that", "these", "those"]);
    pick_fn!(env, "fakeit_PronounInterrogative", &["who", "whom", "whose", "what", "which"]);
    pick_fn!(env, "fakeit_PronounRelative", &["who", "whom", "whose", "which", "that", "as"]);

    // Connectives
    pick_fn!(env, "fakeit_ConnectiveTime", &["after a while", "afterwards", "at last", "at once", "before that", "finally", "first", "immediately", "in the meantime", "later", "meanwhile", "next", "presently", "soon", "then"]);
    pick_fn!(env, "fakeit_ConnectiveComparative", &["however", "in comparison", "in contrast", "instead", "likewise", "nevertheless", "on the contrary", "on the other hand", "similarly", "yet"]);
    pick_fn!(env, "fakeit_ConnectiveComplaint", &["besides", "e.g.", "for example", "for instance", "i.e.", "in other words", "in that", "that is to say"]);
    pick_fn!(env, "fakeit_ConnectiveListing", &["firstly", "secondly", "thirdly", "finally", "in conclusion", "lastly", "to summarise"]);
    pick_fn!(env, "fakeit_ConnectiveCasual", &["an effect of", "an outcome of", "as a consequence of", "as a result of", "because of", "caused by", "consequently", "despite this", "on account of", "therefore"]);
    pick_fn!(env, "fakeit_ConnectiveExamplify", &["as revealed by", "citing", "demonstrated by", "exemplified by", "for example", "for instance", "illustrated by", "in the case of", "proven by", "shown by"]);
}

fn register_fakeit_products(env: &mut Environment<'static>) {
    env.add_function("fakeit_ProductName", || -> String {
        format!(
            "{} {} {}",
            pick(&["Swift", "Prime", "Nova", "Atlas", "Echo", "Vertex", "Zen", "Apex"]),
            pick(&["Steel", "Carbon", "Bamboo", "Leather", "Ceramic", "Glass"]),
            pick(&["Speaker", "Lamp", "Backpack", "Bottle", "Keyboard", "Watch", "Charger", "Headset"])
        )
    });
    env.add_function("fakeit_ProductDescription", || -> String {
        Sentence(8..14).fake()
    });
    pick_fn!(env, "fakeit_ProductCategory", &["clothing", "cosmetics", "electronics", "food and beverage", "furniture", "home appliances", "jewelry", "sports equipment", "toys and games"]);
    pick_fn!(env, "fakeit_ProductFeature", &["energy efficient", "foldable", "portable", "smart", "touchscreen", "ultra-light", "voice-activated", "waterproof", "wireless"]);
    pick_fn!(env, "fakeit_ProductMaterial", &["alloy", "bamboo", "brass", "carbon fiber", "ceramic", "cotton", "glass", "leather", "plastic", "silicone", "steel", "wood"]);
    env.add_function("fakeit_ProductUPC", || random_digits(12));
    pick_fn!(env, "fakeit_ProductAudience", &["athletes", "developers", "gamers", "musicians", "parents", "professionals", "students", "travelers"]);
    pick_fn!(env, "fakeit_ProductDimension", &["pocket-sized", "ultra compact", "compact", "medium", "large", "extra large", "oversized"]);
    pick_fn!(env, "fakeit_ProductUseCase", &["everyday use", "entertainment", "fitness training", "home improvement", "outdoor adventures", "professional work", "travel"]);
    pick_fn!(env, "fakeit_ProductBenefit", &["boosts performance", "enhances comfort", "improves productivity", "increases durability", "reduces costs", "saves time"]);
    pick_fn!(env, "fakeit_ProductSuffix", &["Pro", "Max", "Plus", "Ultra", "Lite", "Mini", "X", "Prime"]);
    env.add_function("fakeit_ProductISBN", || numerify("978-#-###-#####-#"));
}

fn register_fakeit_food_drink(env: &mut Environment<'static>) {
    pick_fn!(env, "fakeit_Breakfast", &["avocado toast", "blueberry pancakes", "french toast", "granola with yogurt", "oatmeal with berries", "omelette", "scrambled eggs"]);
    pick_fn!(env, "fakeit_Lunch", &["burrito bowl", "chicken caesar salad", "club sandwich", "grilled cheese", "ramen", "sushi rolls", "tomato soup"]);
    pick_fn!(env, "fakeit_Dinner", &["beef stew", "grilled salmon", "lasagna", "paella", "roast chicken with vegetables", "spaghetti bolognese", "vegetable curry"]);
    pick_fn!(env, "fakeit_Snack", &["apple slices with peanut butter", "cheese and crackers", "granola bar", "hummus with pita", "popcorn", "trail mix"]);
    pick_fn!(env, "fakeit_Dessert", &["apple pie", "brownies", "cheesecake", "chocolate cake", "creme brulee", "ice cream sundae", "tiramisu"]);

    env.add_function("fakeit_BeerAlcohol", || -> String {
        format!("{:.1}%", rand::rng().random_range(2.0..10.0))
    });
    env.add_function("fakeit_BeerBlg", || -> String {
        format!("{:.1}°Blg", rand::rng().random_range(5.0..20.0))
    });
    env.add_function("fakeit_BeerIbu", || -> String {
        format!("{}IBU", rand::rng().random_range(10..=100))
    });
    pick_fn!(env, "fakeit_BeerHop", &["Ahtanum", "Amarillo", "Cascade", "Centennial", "Chinook", "Citra", "Fuggle", "Galaxy", "Mosaic", "Nugget", "Saaz", "Simcoe"]);
    pick_fn!(env, "fakeit_BeerMalt", &["Black malt", "Caramel", "Carapils", "Chocolate", "Munich", "Pale", "Pilsner", "Rye malt", "Special roast", "Victory", "Vienna", "Wheat malt"]);
    pick_fn!(env, "fakeit_BeerName", &["Celebrator Doppelbock", "Duvel", "Founders Kbs", "Heady Topper", "La Fin Du Monde", "Oak Aged Yeti Imperial Stout", "Pliny The Elder", "Stone Ipa", "Two Hearted Ale", "Zombie Dust"]);
    pick_fn!(env, "fakeit_BeerStyle", &["Amber", "Brown Ale", "India Pale Ale", "Lager", "Pilsner", "Porter", "Saison", "Sour", "Stout", "Wheat"]);
    pick_fn!(env, "fakeit_BeerYeast", &["1007 - German Ale", "1056 - American Ale", "1084 - Irish Ale", "1388 - Belgian Strong Ale", "2007 - Pilsen Lager", "3068 - Weihenstephan Weizen"]);
}

fn register_fakeit_vehicles(env: &mut Environment<'static>) {
    pick_fn!(env, "fakeit_CarMaker", &["Audi", "BMW", "Fiat", "Ford", "Honda", "Mazda", "Nissan", "Peugeot", "Renault", "Toyota", "Volkswagen", "Volvo"]);
    pick_fn!(env, "fakeit_CarModel", &["Accord", "Camry", "Civic", "Corolla", "Focus", "Golf", "Outback", "Passat", "Prius", "Yaris"]);
    pick_fn!(env, "fakeit_CarType", &["Convertible", "Coupe", "Hatchback", "Passenger car compact", "Pickup truck", "SUV", "Sedan", "Van", "Wagon"]);
    pick_fn!(env, "fakeit_CarFuelType", &["CNG", "Diesel", "Electric", "Ethanol", "Gasoline", "LPG", "Methanol"]);
    pick_fn!(env, "fakeit_CarTransmissionType", &["Automatic", "Manual"]);
}

fn register_fakeit_media(env: &mut Environment<'static>) {
    pick_fn!(env, "fakeit_BookTitle", &["Anna Karenina", "Crime and Punishment", "Don Quixote", "Hamlet", "Moby Dick", "One Hundred Years of Solitude", "Pride and Prejudice", "The Great Gatsby", "The Odyssey", "War and Peace"]);
    env.add_function("fakeit_BookAuthor", || -> String { Name().fake() });
    pick_fn!(env, "fakeit_BookGenre", &["Adventure", "Comic", "Crime", "Fantasy", "Historical", "Horror", "Mystery", "Romance", "Science fiction", "Thriller"]);

    pick_fn!(env, "fakeit_MovieName", &["Casablanca", "Citizen Kane", "Forrest Gump", "Inception", "Interstellar", "Pulp Fiction", "The Dark Knight", "The Godfather", "The Matrix", "The Shawshank Redemption"]);
    pick_fn!(env, "fakeit_MovieGenre", &["Action", "Comedy", "Drama", "Film-Noir", "Horror", "Musical", "Mystery", "Romance", "Sci-Fi", "Western"]);

    pick_fn!(env, "fakeit_SongName", &["Bohemian Rhapsody", "Billie Jean", "Hey Jude", "Hotel California", "Imagine", "Like a Rolling Stone", "Purple Rain", "Smells Like Teen Spirit", "Stairway to Heaven", "What a Wonderful World"]);
    env.add_function("fakeit_SongArtist", || -> String { Name().fake() });
    pick_fn!(env, "fakeit_SongGenre", &["Blues", "Classical", "Country", "Electronic", "Folk", "Hip hop", "Jazz", "Pop", "Reggae", "Rock"]);

    pick_fn!(env, "fakeit_CelebrityActor", &["Cate Blanchett", "Denzel Washington", "Leonardo DiCaprio", "Meryl Streep", "Scarlett Johansson", "Tom Hanks"]);
    pick_fn!(env, "fakeit_CelebrityBusiness", &["Elon Musk", "Jeff Bezos", "Oprah Winfrey", "Richard Branson", "Warren Buffett"]);
    pick_fn!(env, "fakeit_CelebritySport", &["Lionel Messi", "Roger Federer", "Serena Williams", "Simone Biles", "Usain Bolt"]);

    pick_fn!(env, "fakeit_School", &["Hillcrest Elementary", "Lakeview Academy", "Maple Grove Middle School", "Northgate College", "Riverside High School", "Westwood University"]);

    env.add_function("fakeit_Gamertag", || -> String {
        format!(
            "{}{}{}",
            pick(&["Shadow", "Turbo", "Mega", "Silent", "Crimson", "Iron", "Neon", "Frost"]),
            pick(&["Wolf", "Falcon", "Ninja", "Racer", "Hunter", "Wizard", "Ghost", "Storm"]),
            random_digits(2)
        )
    });

    pick_fn!(env, "fakeit_MinecraftOre", &["coal", "copper", "iron", "gold", "redstone", "lapis", "diamond", "emerald"]);
    pick_fn!(env, "fakeit_MinecraftWood", &["oak", "spruce", "birch", "jungle", "acacia", "dark oak", "mangrove", "cherry"]);
    pick_fn!(env, "fakeit_MinecraftArmorTier", &["leather", "golden", "chainmail", "iron", "diamond", "netherite"]);
    pick_fn!(env, "fakeit_MinecraftArmorPart", &["helmet", "chestplate", "leggings", "boots"]);
    pick_fn!(env, "fakeit_MinecraftWeapon", &["sword", "bow", "crossbow", "trident", "axe"]);
    pick_fn!(env, "fakeit_MinecraftTool", &["pickaxe", "axe", "shovel", "hoe", "fishing rod", "shears", "flint and steel"]);
    pick_fn!(env, "fakeit_MinecraftDye", &["white", "orange", "magenta", "light blue", "yellow", "lime", "pink", "gray", "cyan", "purple", "blue", "brown", "green", "red", "black"]);
    pick_fn!(env, "fakeit_MinecraftFood", &["apple", "bread", "carrot", "baked potato", "cooked beef", "cooked chicken", "golden apple", "melon slice", "pumpkin pie"]);
    pick_fn!(env, "fakeit_MinecraftAnimal", &["pig", "cow", "sheep", "chicken", "rabbit", "horse", "donkey", "llama", "cat", "wolf"]);
    pick_fn!(env, "fakeit_MinecraftVillagerJob", &["armorer", "butcher", "cartographer", "cleric", "farmer", "fisherman", "fletcher", "leatherworker", "librarian", "mason", "shepherd", "toolsmith", "weaponsmith"]);
    pick_fn!(env, "fakeit_MinecraftVillagerStation", &["barrel", "blast furnace", "brewing stand", "cartography table", "cauldron", "composter", "fletching table", "grindstone", "lectern", "loom", "smithing table", "smoker", "stonecutter"]);
    pick_fn!(env, "fakeit_MinecraftVillagerLevel", &["novice", "apprentice", "journeyman", "expert", "master"]);
    pick_fn!(env, "fakeit_MinecraftMobPassive", &["bat", "chicken", "cod", "cow", "mooshroom", "pig", "rabbit", "salmon", "sheep", "squid", "strider", "villager"]);
    pick_fn!(env, "fakeit_MinecraftMobNeutral", &["bee", "dolphin", "enderman", "iron golem", "llama", "panda", "piglin", "polar bear", "spider", "wolf"]);
    pick_fn!(env, "fakeit_MinecraftMobHostile", &["blaze", "creeper", "drowned", "evoker", "ghast", "guardian", "husk", "phantom", "pillager", "skeleton", "slime", "witch", "zombie"]);
    pick_fn!(env, "fakeit_MinecraftMobBoss", &["ender dragon", "wither", "elder guardian"]);
    pick_fn!(env, "fakeit_MinecraftBiome", &["badlands", "desert", "forest", "jungle", "mountains", "mushroom fields", "ocean", "plains", "savanna", "swamp", "taiga", "tundra"]);
    pick_fn!(env, "fakeit_MinecraftWeather", &["clear", "rain", "thunder"]);
}

const EMOJI_POOL: &[&str] = &[
    "😀", "😂", "😍", "🤔", "😎", "🥳", "🦀", "🚀", "🔥", "✨", "🎯", "🌊", "🍀", "⚡", "🍕", "🎸",
];

fn register_fakeit_emoji(env: &mut Environment<'static>) {
    pick_fn!(env, "fakeit_EmojiCategory", &["Activities", "Animals & Nature", "Flags", "Food & Drink", "Objects", "People & Body", "Smileys & Emotion", "Symbols", "Travel & Places"]);
    pick_fn!(env, "fakeit_EmojiAlias", &[":fire:", ":heart:", ":joy:", ":rocket:", ":smile:", ":sparkles:", ":tada:", ":thumbsup:"]);
    pick_fn!(env, "fakeit_EmojiTag", &["celebration", "cool", "fire", "happy", "love", "party", "sad", "wow"]);
    pick_fn!(env, "fakeit_EmojiFlag", &["🇧🇷", "🇨🇦", "🇩🇪", "🇫🇷", "🇮🇳", "🇯🇵", "🇳🇬", "🇺🇸"]);
    pick_fn!(env, "fakeit_EmojiAnimal", &["🦊", "🐼", "🐧", "🦉", "🐙", "🐢", "🦁", "🐳"]);
    pick_fn!(env, "fakeit_EmojiFood", &["🍕", "🍣", "🥐", "🌮", "🍜", "🍎", "🥑", "🍩"]);
    pick_fn!(env, "fakeit_EmojiPlant", &["🌵", "🌲", "🌸", "🍀", "🌻", "🌿", "🌴"]);
    pick_fn!(env, "fakeit_EmojiMusic", &["🎸", "🎹", "🎷", "🥁", "🎻", "🎺"]);
    pick_fn!(env, "fakeit_EmojiVehicle", &["🚗", "🚲", "🚀", "✈️", "🚂", "⛵", "🛵"]);
    pick_fn!(env, "fakeit_EmojiSport", &["⚽", "🏀", "🎾", "🏓", "🏐", "⛳", "🥊"]);
    pick_fn!(env, "fakeit_EmojiFace", &["😀", "😂", "😍", "🤔", "😴", "😎", "🥳", "😭"]);
    pick_fn!(env, "fakeit_EmojiHand", &["👍", "👏", "🤝", "✌️", "👋", "🤙", "🙌"]);
    pick_fn!(env, "fakeit_EmojiClothing", &["👕", "👗", "🧥", "👟", "🎩", "🧣", "🧤"]);
    pick_fn!(env, "fakeit_EmojiLandmark", &["🗽", "🗼", "🏰", "🕌", "⛩️", "🗿"]);
    pick_fn!(env, "fakeit_EmojiElectronics", &["💻", "📱", "🖥️", "⌚", "📷", "🎧"]);
    pick_fn!(env, "fakeit_EmojiGame", &["🎮", "🎲", "♟️", "🧩", "🕹️", "🎯"]);
    pick_fn!(env, "fakeit_EmojiTools", &["🔨", "🪛", "🔧", "🪚", "🛠️", "⚙️"]);
    pick_fn!(env, "fakeit_EmojiWeather", &["☀️", "🌧️", "⛈️", "🌩️", "❄️", "🌪️", "🌈"]);
    pick_fn!(env, "fakeit_EmojiJob", &["👮", "👩‍⚕️", "👨‍🍳", "👩‍🏫", "👨‍🚒", "👩‍✈️"]);
    pick_fn!(env, "fakeit_EmojiPerson", &["🧑", "👶", "👩", "👨", "🧓", "👧"]);
    pick_fn!(env, "fakeit_EmojiGesture", &["🤷", "🙆", "🙅", "💁", "🙇", "🤦"]);
    pick_fn!(env, "fakeit_EmojiCostume", &["🦸", "🦹", "🧙", "🧛", "🧜", "🤡"]);
    env.add_function("fakeit_EmojiSentence", || -> String {
        let mut rng = rand::rng();
        (0..3)
            .map(|_| *EMOJI_POOL.choose(&mut rng).unwrap_or(&"✨"))
            .collect::<Vec<_>>()
            .join(" ")
    });
}

const HACKER_ABBREVIATIONS: &[&str] = &["TCP", "HTTP", "SDD", "RAM", "GB", "CSS", "SSL", "AGP", "SQL", "FTP", "PCI", "AI", "ADP", "RSS", "XML", "EXE", "COM", "HDD", "THX", "SMTP", "SMS", "USB", "PNG", "SAS", "JBOD", "SCSI", "JSON", "XSS", "JPG"];
const HACKER_ADJECTIVES: &[&str] = &["auxiliary", "primary", "back-end", "digital", "open-source", "virtual", "cross-platform", "redundant", "online", "haptic", "multi-byte", "bluetooth", "wireless", "1080p", "neural", "optical", "solid state", "mobile"];
const HACKER_NOUNS: &[&str] = &["driver", "protocol", "bandwidth", "panel", "microchip", "program", "port", "card", "array", "interface", "system", "sensor", "firewall", "hard drive", "pixel", "alarm", "feed", "monitor", "application", "transmitter", "bus", "circuit", "capacitor", "matrix"];
const HACKER_VERBS: &[&str] = &["back up", "bypass", "hack", "override", "compress", "copy", "navigate", "index", "connect", "generate", "quantify", "calculate", "synthesize", "input", "transmit", "program", "reboot", "parse"];
const HIPSTER_WORDS: &[&str] = &["artisan", "austin", "banjo", "beard", "brooklyn", "brunch", "chia", "cliche", "cold-pressed", "cornhole", "craft beer", "distillery", "dreamcatcher", "ethical", "fixie", "flannel", "gastropub", "gluten-free", "hashtag", "heirloom", "hella", "kale chips", "kombucha", "letterpress", "locavore", "mustache", "organic", "pop-up", "quinoa", "raw denim", "selvage", "single-origin coffee", "small batch", "sriracha", "sustainable", "tote bag", "typewriter", "vinyl"];

fn hipster_sentence(words: usize) -> String {
    let mut rng = rand::rng();
    let mut picked: Vec<&str> = (0..words.max(1))
        .map(|_| *HIPSTER_WORDS.choose(&mut rng).unwrap_or(&"artisan"))
        .collect();
    let first = picked.remove(0);
    let mut out = String::new();
    let mut chars = first.chars();
    if let Some(c) = chars.next() {
        out.extend(c.to_uppercase());
        out.push_str(chars.as_str());
    }
    for word in picked {
        out.push(' ');
        out.push_str(word);
    }
    out.push('.');
    out
}

fn register_fakeit_hacker_hipster(env: &mut Environment<'static>) {
    pick_fn!(env, "fakeit_HackerAbbreviation", HACKER_ABBREVIATIONS);
    pick_fn!(env, "fakeit_HackerAdjective", HACKER_ADJECTIVES);
    pick_fn!(env, "fakeit_HackerNoun", HACKER_NOUNS);
    pick_fn!(env, "fakeit_HackerVerb", HACKER_VERBS);
    pick_fn!(env, "fakeit_HackeringVerb", &["backing up", "bypassing", "hacking", "overriding", "compressing", "copying", "navigating", "indexing", "connecting", "generating", "quantifying", "calculating", "synthesizing", "transmitting", "programming", "parsing"]);
    env.add_function("fakeit_HackerPhrase", || -> String {
        format!(
            "If we {} the {}, we can get to the {} {} through the {} {}!",
            pick(HACKER_VERBS),
            pick(HACKER_NOUNS),
            pick(HACKER_ABBREVIATIONS),
            pick(HACKER_NOUNS),
            pick(HACKER_ADJECTIVES),
            pick(HACKER_NOUNS)
        )
    });

    pick_fn!(env, "fakeit_HipsterWord", HIPSTER_WORDS);
    env.add_function("fakeit_HipsterSentence", |words: i64| -> String {
        hipster_sentence(words.max(1) as usize)
    });
    env.add_function("fakeit_HipsterParagraph", |sentences: i64| -> String {
        (0..sentences.max(1))
            .map(|_| hipster_sentence(8))
            .collect::<Vec<_>>()
            .join(" ")
    });
}

fn register_fakeit_errors(env: &mut Environment<'static>) {
    pick_fn!(env, "fakeit_Error", &["failed to copy input", "invalid argument", "operation not permitted", "resource temporarily unavailable", "something went wrong", "unexpected end of input"]);
    pick_fn!(env, "fakeit_ErrorDatabase", &["database is locked", "destination pointer is nil", "sql: no rows in result set", "table does not exist", "too many connections"]);
    pick_fn!(env, "fakeit_ErrorGRPC", &["connection refused", "context deadline exceeded", "rpc error: code = Unavailable", "transport is closing"]);
    pick_fn!(env, "fakeit_ErrorHTTP", &["http: request body too large", "invalid method", "net/http: abort Handler", "wrote more than the declared Content-Length"]);
    pick_fn!(env, "fakeit_ErrorHTTPClient", &["bad request", "forbidden", "not found", "payment required", "unauthorized"]);
    pick_fn!(env, "fakeit_ErrorHTTPServer", &["bad gateway", "gateway timeout", "internal server error", "not implemented", "service unavailable"]);
    pick_fn!(env, "fakeit_ErrorRuntime", &["index out of range", "panic: runtime error: invalid memory address or nil pointer dereference", "slice bounds out of range", "stack overflow"]);
}

fn register_fakeit_internet_extra(env: &mut Environment<'static>) {
    env.add_function("fakeit_ChromeUserAgent", || -> String {
        let mut rng = rand::rng();
        format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.{}.{} Safari/537.36",
            rng.random_range(100..=126),
            rng.random_range(4000..=6500),
            rng.random_range(0..=220)
        )
    });
    env.add_function("fakeit_FirefoxUserAgent", || -> String {
        let version = rand::rng().random_range(100..=128);
        format!("Mozilla/5.0 (X11; Linux x86_64; rv:{version}.0) Gecko/20100101 Firefox/{version}.0")
    });
    env.add_function("fakeit_OperaUserAgent", || -> String {
        let mut rng = rand::rng();
        format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 OPR/{}.0.0.0",
            rng.random_range(100..=126),
            rng.random_range(85..=110)
        )
    });
    env.add_function("fakeit_SafariUserAgent", || -> String {
        let mut rng = rand::rng();
        format!(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{}.{} Safari/605.1.15",
            rng.random_range(14..=17),
            rng.random_range(0..=6)
        )
    });
    pick_fn!(env, "fakeit_APIUserAgent", &["curl/8.4.0", "Go-http-client/2.0", "okhttp/4.12.0", "PostmanRuntime/7.36.0", "python-requests/2.31.0"]);

    pick_fn!(env, "fakeit_InputName", &["address", "city", "country", "email", "first_name", "last_name", "message", "state", "subject", "zip"]);
    env.add_function("fakeit_Svg", || -> String {
        let mut rng = rand::rng();
        let width = rng.random_range(100..=500);
        let height = rng.random_range(100..=500);
        let color = format!("#{:06x}", rng.random_range(0..0x1000000u32));
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\"><rect width=\"{width}\" height=\"{height}\" fill=\"{color}\"/></svg>"
        )
    });
}

fn register_fakeit_time_extra(env: &mut Environment<'static>) {
    env.add_function("fakeit_DateRange", |start: String, end: String| -> String {
        let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d");
        match (parse(&start), parse(&end)) {
            (Ok(from), Ok(to)) if to > from => {
                let days = (to - from).num_days();
                let offset = rand::rng().random_range(0..=days);
                (from + ChronoDuration::days(offset)).to_string()
            }
            (Ok(from), _) => from.to_string(),
            _ => Utc::now().date_naive().to_string(),
        }
    });
    pick_fn!(env, "fakeit_TimeZoneFull", &["(UTC) Coordinated Universal Time", "(UTC-08:00) Pacific Time (US & Canada)", "(UTC-05:00) Eastern Time (US & Canada)", "(UTC+01:00) Amsterdam, Berlin, Bern, Rome", "(UTC+05:30) Chennai, Kolkata, Mumbai, New Delhi", "(UTC+09:00) Osaka, Sapporo, Tokyo"]);
    env.add_function("fakeit_TimeZoneOffset", || -> f64 {
        const OFFSETS: [f64; 12] = [-8.0, -7.0, -6.0, -5.0, -3.0, 0.0, 1.0, 2.0, 3.0, 5.5, 9.0, 10.0];
        let mut rng = rand::rng();
        OFFSETS[rng.random_range(0..OFFSETS.len())]
    });
}

fn register_fakeit_finance_extra(env: &mut Environment<'static>) {
    const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
    const ALNUM_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    env.add_function("fakeit_BitcoinPrivateKey", || -> String {
        let mut rng = rand::rng();
        let mut out = String::from("5");
        for _ in 0..50 {
            out.push(BASE58[rng.random_range(0..BASE58.len())] as char);
        }
        out
    });
    pick_fn!(env, "fakeit_BankType", &["Central", "Commercial", "Credit Union", "Investment", "Retail", "Savings"]);
    env.add_function("fakeit_Cusip", || -> String {
        let mut rng = rand::rng();
        let mut out: String = (0..8)
            .map(|_| ALNUM_UPPER[rng.random_range(0..ALNUM_UPPER.len())] as char)
            .collect();
        out.push(char::from_digit(rng.random_range(0..10), 10).unwrap_or('0'));
        out
    });
    env.add_function("fakeit_Isin", || -> String {
        let mut rng = rand::rng();
        let mut out = String::from("US");
        for _ in 0..9 {
            out.push(ALNUM_UPPER[rng.random_range(0..ALNUM_UPPER.len())] as char);
        }
        out.push(char::from_digit(rng.random_range(0..10), 10).unwrap_or('0'));
        out
    });
}

fn register_fakeit_misc_extra(env: &mut Environment<'static>) {
    pick_fn!(env, "fakeit_Ethnicity", &["African American", "Asian", "Hispanic", "Native American", "Pacific Islander", "Two or more races", "White"]);
    pick_fn!(env, "fakeit_AnimalType", &["amphibians", "birds", "fish", "invertebrates", "mammals", "reptiles"]);
    pick_fn!(env, "fakeit_FarmAnimal", &["chicken", "cow", "duck", "goat", "horse", "pig", "sheep"]);
    pick_fn!(env, "fakeit_Bird", &["blackbird", "crow", "eagle", "heron", "kingfisher", "owl", "robin", "sparrow", "swallow", "wren"]);
    env.add_function("fakeit_NiceColors", || -> Value {
        let mut rng = rand::rng();
        let palette: Vec<String> = (0..5)
            .map(|_| format!("#{:06x}", rng.random_range(0..0x1000000u32)))
            .collect();
        Value::from_serialize(&palette)
    });
}

fn register_fakeit_formats(env: &mut Environment<'static>) {
    env.add_function("fakeit_JSON", || -> String {
        let mut rng = rand::rng();
        format!(
            "{{\"id\":{},\"name\":\"{}\",\"email\":\"{}\",\"active\":{}}}",
            rng.random_range(1..100000),
            Name().fake::<String>(),
            SafeEmail().fake::<String>(),
            rng.random_range(0..2) == 1
        )
    });
    env.add_function("fakeit_XML", || -> String {
        let mut rng = rand::rng();
        format!(
            "<record><id>{}</id><name>{}</name><email>{}</email></record>",
            rng.random_range(1..100000),
            Name().fake::<String>(),
            SafeEmail().fake::<String>()
        )
    });
    env.add_function("fakeit_CSV", |rows: i64| -> String {
        let mut rng = rand::rng();
        let mut out = String::from("name,email,number\n");
        for _ in 0..rows.clamp(1, 1000) {
            out.push_str(&format!(
                "{},{},{}\n",
                Name().fake::<String>(),
                SafeEmail().fake::<String>(),
                rng.random_range(1..100000)
            ));
        }
        out
    });
    env.add_function("fakeit_Markdown", || -> String {
        format!(
            "# {}\n\n{}\n\n- {}\n- {}\n- {}\n",
            Buzzword().fake::<String>(),
            Sentence(8..14).fake::<String>(),
            Word().fake::<String>(),
            Word().fake::<String>(),
            Word().fake::<String>()
        )
    });
    env.add_function("fakeit_EmailText", || -> String {
        format!(
            "Hi {},\n\n{}\n\nBest regards,\n{}\n",
            FirstName().fake::<String>(),
            Paragraph(2..4).fake::<String>(),
            Name().fake::<String>()
        )
    });
    env.add_function("fakeit_FixedWidth", || -> String {
        let mut rng = rand::rng();
        let mut out = format!("{:<20}{:<30}{:<8}\n", "Name", "Email", "Number");
        for _ in 0..3 {
            out.push_str(&format!(
                "{:<20}{:<30}{:<8}\n",
                Name().fake::<String>(),
                SafeEmail().fake::<String>(),
                rng.random_range(1..100000)
            ));
        }
        out
    });
    // Substitutes {name}, {firstname}, {lastname}, {email}, {word} and
    // {number} placeholders; each placeholder gets one value per render.
    env.add_function("fakeit_Template", |template: String| -> String {
        let mut rng = rand::rng();
        template
            .replace("{name}", &Name().fake::<String>())
            .replace("{firstname}", &FirstName().fake::<String>())
            .replace("{lastname}", &LastName().fake::<String>())
            .replace("{email}", &SafeEmail().fake::<String>())
            .replace("{word}", &Word().fake::<String>())
            .replace("{number}", &rng.random_range(0..100000).to_string())
    });
    // gofakeit Generate semantics: # becomes a digit, ? becomes a letter.
    env.add_function("fakeit_Generate", |pattern: String| -> String {
        lexify(&numerify(&pattern))
    });
    env.add_function("fakeit_Map", || -> Value {
        let mut rng = rand::rng();
        let mut map = std::collections::BTreeMap::new();
        for _ in 0..rng.random_range(3..=5) {
            map.insert(Word().fake::<String>(), Word().fake::<String>());
        }
        Value::from_serialize(&map)
    });
    env.add_function(
        "fakeit_Weighted",
        |values: Vec<Value>, weights: Vec<f64>| -> Value {
            if values.is_empty() {
                return Value::from(());
            }
            let mut rng = rand::rng();
            if weights.len() != values.len() {
                return values[rng.random_range(0..values.len())].clone();
            }
            let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
            if total <= 0.0 {
                return values[rng.random_range(0..values.len())].clone();
            }
            let mut target = rng.random_range(0.0..total);
            for (value, weight) in values.iter().zip(&weights) {
                if *weight <= 0.0 {
                    continue;
                }
                if target < *weight {
                    return value.clone();
                }
                target -= *weight;
            }
            values[values.len() - 1].clone()
        },
    );
    env.add_function("fakeit_ShuffleStrings", |values: Vec<String>| -> Value {
        let mut values = values;
        values.shuffle(&mut rand::rng());
        Value::from_serialize(&values)
    });
    env.add_function("fakeit_ShuffleInts", |values: Vec<i64>| -> Value {
        let mut values = values;
        values.shuffle(&mut rand::rng());
        Value::from_serialize(&values)
    });
    env.add_function("fakeit_Dice", |dice: i64, sides: i64| -> Value {
        let mut rng = rand::rng();
        let sides = sides.max(1);
        let rolls: Vec<i64> = (0..dice.clamp(1, 100))
            .map(|_| rng.random_range(1..=sides))
            .collect();
        Value::from_serialize(&rolls)
    });
    env.add_function("fakeit_Regex", |pattern: String| regex_sample(&pattern));
    env.add_function("fakeit_ImageJpeg", |width: i64, height: i64| -> String {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        fill_image_bytes(&mut bytes, width, height);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        String::from_utf8_lossy(&bytes).into_owned()
    });
    env.add_function("fakeit_ImagePng", |width: i64, height: i64| -> String {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        fill_image_bytes(&mut bytes, width, height);
        String::from_utf8_lossy(&bytes).into_owned()
    });
}

// Composite records. The upstream generator returns structs for these;
// in a text registry they render as compact JSON objects.
fn register_fakeit_composites(env: &mut Environment<'static>) {
    env.add_function("fakeit_Person", || -> String {
        format!(
            "{{\"name\":\"{}\",\"email\":\"{}\",\"phone\":\"{}\",\"hobby\":\"{}\"}}",
            Name().fake::<String>(),
            SafeEmail().fake::<String>(),
            PhoneNumber().fake::<String>(),
            pick(&["reading", "chess", "cycling", "photography", "cooking", "gardening"])
        )
    });
    env.add_function("fakeit_Contact", || -> String {
        format!(
            "{{\"email\":\"{}\",\"phone\":\"{}\"}}",
            SafeEmail().fake::<String>(),
            PhoneNumber().fake::<String>()
        )
    });
    env.add_function("fakeit_Address", || -> String {
        let mut rng = rand::rng();
        format!(
            "{{\"street\":\"{} {}\",\"city\":\"{}\",\"state\":\"{}\",\"zip\":\"{}\",\"country\":\"{}\",\"latitude\":{:.4},\"longitude\":{:.4}}}",
            BuildingNumber().fake::<String>(),
            StreetName().fake::<String>(),
            CityName().fake::<String>(),
            StateName().fake::<String>(),
            ZipCode().fake::<String>(),
            CountryName().fake::<String>(),
            rng.random_range(-90.0..90.0),
            rng.random_range(-180.0..180.0)
        )
    });
    env.add_function("fakeit_Job", || -> String {
        format!(
            "{{\"company\":\"{}\",\"title\":\"{}\",\"descriptor\":\"{}\",\"level\":\"{}\"}}",
            CompanyName().fake::<String>(),
            JobTitle().fake::<String>(),
            Seniority().fake::<String>(),
            JobField().fake::<String>()
        )
    });
    env.add_function("fakeit_CreditCard", || -> String {
        let mut rng = rand::rng();
        format!(
            "{{\"type\":\"{}\",\"number\":\"{}\",\"exp\":\"{:02}/{:02}\",\"cvv\":\"{}\"}}",
            pick(&["Visa", "MasterCard", "American Express", "Discover", "JCB", "UnionPay"]),
            CreditCardNumber().fake::<String>(),
            rng.random_range(1..=12),
            rng.random_range(26..=32),
            random_digits(3)
        )
    });
    env.add_function("fakeit_Currency", || -> String {
        format!(
            "{{\"short\":\"{}\",\"long\":\"{}\"}}",
            CurrencyCode().fake::<String>(),
            CurrencyName().fake::<String>()
        )
    });
    env.add_function("fakeit_Product", || -> String {
        let mut rng = rand::rng();
        format!(
            "{{\"name\":\"{} {}\",\"category\":\"{}\",\"price\":{:.2},\"upc\":\"{}\"}}",
            pick(&["Swift", "Prime", "Nova", "Atlas", "Echo", "Vertex"]),
            pick(&["Speaker", "Lamp", "Backpack", "Bottle", "Keyboard", "Watch"]),
            pick(&["clothing", "electronics", "furniture", "jewelry", "toys and games"]),
            rng.random_range(1.0..500.0),
            random_digits(12)
        )
    });
    env.add_function("fakeit_Book", || -> String {
        format!(
            "{{\"title\":\"{}\",\"author\":\"{}\",\"genre\":\"{}\"}}",
            pick(&["Anna Karenina", "Don Quixote", "Hamlet", "Moby Dick", "The Great Gatsby", "War and Peace"]),
            Name().fake::<String>(),
            pick(&["Adventure", "Crime", "Fantasy", "Mystery", "Romance", "Thriller"])
        )
    });
    env.add_function("fakeit_Movie", || -> String {
        format!(
            "{{\"name\":\"{}\",\"genre\":\"{}\"}}",
            pick(&["Casablanca", "Inception", "Pulp Fiction", "The Godfather", "The Matrix"]),
            pick(&["Action", "Comedy", "Drama", "Horror", "Sci-Fi", "Western"])
        )
    });
    env.add_function("fakeit_Song", || -> String {
        format!(
            "{{\"name\":\"{}\",\"artist\":\"{}\",\"genre\":\"{}\"}}",
            pick(&["Bohemian Rhapsody", "Hey Jude", "Imagine", "Purple Rain", "Stairway to Heaven"]),
            Name().fake::<String>(),
            pick(&["Blues", "Country", "Jazz", "Pop", "Reggae", "Rock"])
        )
    });
    env.add_function("fakeit_Car", || -> String {
        let mut rng = rand::rng();
        format!(
            "{{\"brand\":\"{}\",\"model\":\"{}\",\"type\":\"{}\",\"fuel\":\"{}\",\"transmission\":\"{}\",\"year\":{}}}",
            pick(&["Audi", "BMW", "Ford", "Honda", "Toyota", "Volvo"]),
            pick(&["Accord", "Civic", "Corolla", "Focus", "Golf", "Prius"]),
            pick(&["Convertible", "Coupe", "Hatchback", "SUV", "Sedan", "Wagon"]),
            pick(&["Diesel", "Electric", "Gasoline", "LPG"]),
            pick(&["Automatic", "Manual"]),
            rng.random_range(1990..=2026)
        )
    });
    pick_fn!(env, "fakeit_ErrorInput", &["checksum mismatch", "field required", "invalid format", "value out of range"]);
    env.add_function("fakeit_Image", |width: i64, height: i64| -> String {
        let mut bytes = Vec::new();
        fill_image_bytes(&mut bytes, width, height);
        String::from_utf8_lossy(&bytes).into_owned()
    });
    env.add_function("fakeit_RandomMapKey", |value: Value| -> Value {
        let Ok(iter) = value.try_iter() else {
            return Value::from(());
        };
        let keys: Vec<Value> = iter.collect();
        if keys.is_empty() {
            return Value::from(());
        }
        keys[rand::rng().random_range(0..keys.len())].clone()
    });
    env.add_function("fakeit_ShuffleAnySlice", |values: Vec<Value>| -> Value {
        let mut values = values;
        values.shuffle(&mut rand::rng());
        Value::from(values)
    });
    env.add_function("fakeit_Slice", |len: i64| -> Value {
        let words: Vec<String> = (0..len.clamp(1, 100))
            .map(|_| Word().fake::<String>())
            .collect();
        Value::from_serialize(&words)
    });
    env.add_function("fakeit_Struct", || -> String {
        let mut rng = rand::rng();
        format!(
            "{{\"id\":{},\"name\":\"{}\",\"active\":{},\"tags\":[\"{}\",\"{}\"]}}",
            rng.random_range(1..100000),
            Name().fake::<String>(),
            rng.random_range(0..2) == 1,
            Word().fake::<String>(),
            Word().fake::<String>()
        )
    });
    env.add_function(
        "fakeit_Teams",
        |people: Vec<String>, teams: Vec<String>| -> Value {
            let mut people = people;
            people.shuffle(&mut rand::rng());
            let mut assignment: std::collections::BTreeMap<String, Vec<String>> = teams
                .iter()
                .map(|team| (team.clone(), Vec::new()))
                .collect();
            if !teams.is_empty() {
                for (index, person) in people.into_iter().enumerate() {
                    let team = &teams[index % teams.len()];
                    if let Some(members) = assignment.get_mut(team) {
                        members.push(person);
                    }
                }
            }
            Value::from_serialize(&assignment)
        },
    );
}

fn fill_image_bytes(bytes: &mut Vec<u8>, width: i64, height: i64) {
    let mut rng = rand::rng();
    let size = (width.max(1) * height.max(1)).clamp(16, 4096) as usize;
    bytes.extend((0..size).map(|_| rng.random::<u8>()));
}

/// Samples a string from a small regex subset: `\d`, `\w`, `\s`, character
/// classes with ranges, and the `{n}`, `{n,m}`, `+`, `*`, `?` quantifiers.
/// Unsupported syntax passes through literally.
fn regex_sample(pattern: &str) -> String {
    enum Token {
        Digit,
        WordChar,
        Space,
        Class(Vec<char>),
        Literal(char),
    }

    let mut rng = rand::rng();
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let token = match chars[i] {
            '^' | '$' => {
                i += 1;
                continue;
            }
            '\\' if i + 1 < chars.len() => {
                i += 2;
                match chars[i - 1] {
                    'd' => Token::Digit,
                    'w' => Token::WordChar,
                    's' => Token::Space,
                    other => Token::Literal(other),
                }
            }
            '[' => {
                let mut set = Vec::new();
                i += 1;
                while i < chars.len() && chars[i] != ']' {
                    if i + 2 < chars.len() && chars[i + 1] == '-' && chars[i + 2] != ']' {
                        let (lo, hi) = (chars[i] as u32, chars[i + 2] as u32);
                        if lo <= hi {
                            for code in lo..=hi {
                                if let Some(c) = char::from_u32(code) {
                                    set.push(c);
                                }
                            }
                        }
                        i += 3;
                    } else {
                        set.push(chars[i]);
                        i += 1;
                    }
                }
                if i < chars.len() {
                    i += 1;
                }
                Token::Class(set)
            }
            c => {
                i += 1;
                Token::Literal(c)
            }
        };

        let mut count = 1usize;
        if i < chars.len() {
            match chars[i] {
                '{' => {
                    let mut spec = String::new();
                    i += 1;
                    while i < chars.len() && chars[i] != '}' {
                        spec.push(chars[i]);
                        i += 1;
                    }
                    if i < chars.len() {
                        i += 1;
                    }
                    count = match spec.split_once(',') {
                        Some((lo, hi)) => {
                            let lo: usize = lo.trim().parse().unwrap_or(1);
                            let hi: usize = hi.trim().parse().unwrap_or(lo);
                            if hi > lo {
                                rng.random_range(lo..=hi)
                            } else {
                                lo
                            }
                        }
                        None => spec.trim().parse().unwrap_or(1),
                    };
                }
                '+' => {
                    i += 1;
                    count = rng.random_range(1..=3);
                }
                '*' => {
                    i += 1;
                    count = rng.random_range(0..=3);
                }
                '?' => {
                    i += 1;
                    count = rng.random_range(0..=1);
                }
                _ => {}
            }
        }

        for _ in 0..count {
            let c = match &token {
                Token::Digit => char::from_digit(rng.random_range(0..10), 10).unwrap_or('0'),
                Token::WordChar => (b'a' + rng.random_range(0..26u8)) as char,
                Token::Space => ' ',
                Token::Class(set) if !set.is_empty() => set[rng.random_range(0..set.len())],
                Token::Class(_) => continue,
                Token::Literal(c) => *c,
            };
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn env_with_body(
        cache: Arc<FileCache>,
        state: Arc<FormDataState>,
    ) -> Environment<'static> {
        let mut env = Environment::new();
        register_body_functions(&mut env, cache, state);
        env
    }

    fn render(env: &Environment<'static>, source: &str) -> String {
        let tmpl = env.template_from_str(source).unwrap();
        tmpl.render(minijinja::context! {}).unwrap()
    }

    #[test]
    fn string_helpers() {
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        assert_eq!(render(&env, "{{ strings_ToUpper(\"abc\") }}"), "ABC");
        assert_eq!(render(&env, "{{ strings_First(\"hello\", 2) }}"), "he");
        assert_eq!(render(&env, "{{ strings_Last(\"hello\", 2) }}"), "lo");
        assert_eq!(
            render(&env, "{{ strings_TrimPrefix(\"foobar\", \"foo\") }}"),
            "bar"
        );
        assert_eq!(
            render(&env, "{{ strings_Replace(\"aaa\", \"a\", \"b\", 2) }}"),
            "bba"
        );
    }

    #[test]
    fn fake_functions_produce_values() {
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        assert!(!render(&env, "{{ fakeit_Name() }}").is_empty());
        assert_eq!(render(&env, "{{ fakeit_UUID() }}").len(), 36);
        let n: i64 = render(&env, "{{ fakeit_IntN(10) }}").parse().unwrap();
        assert!((0..10).contains(&n));
        assert_eq!(render(&env, "{{ fakeit_DigitN(5) }}").len(), 5);
    }

    #[test]
    fn extended_registry_produces_values() {
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        for source in [
            "{{ fakeit_BeerName() }}",
            "{{ fakeit_MinecraftOre() }}",
            "{{ fakeit_EmojiFace() }}",
            "{{ fakeit_CarMaker() }}",
            "{{ fakeit_ProductName() }}",
            "{{ fakeit_HackerPhrase() }}",
            "{{ fakeit_HipsterSentence(6) }}",
            "{{ fakeit_ErrorDatabase() }}",
            "{{ fakeit_ChromeUserAgent() }}",
            "{{ fakeit_AdverbManner() }}",
            "{{ fakeit_PronounPossessive() }}",
            "{{ fakeit_BookTitle() }}",
            "{{ fakeit_Cusip() }}",
            "{{ fakeit_JSON() }}",
            "{{ fakeit_Markdown() }}",
            "{{ fakeit_Person() }}",
        ] {
            assert!(!render(&env, source).is_empty(), "empty output for {source}");
        }
    }

    #[test]
    fn regex_sampler_honors_classes_and_counts() {
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        let digits = render(&env, r#"{{ fakeit_Regex("\\d{4}") }}"#);
        assert_eq!(digits.len(), 4);
        assert!(digits.chars().all(|c| c.is_ascii_digit()), "got {digits}");

        let word = render(&env, r#"{{ fakeit_Regex("[a-c]{3}-\\w") }}"#);
        assert_eq!(word.len(), 5);
        assert!(word[..3].chars().all(|c| ('a'..='c').contains(&c)), "got {word}");
        assert_eq!(&word[3..4], "-");
    }

    #[test]
    fn generate_expands_digit_and_letter_placeholders() {
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        let out = render(&env, "{{ fakeit_Generate(\"ORD-###-??\") }}");
        assert_eq!(out.len(), 10);
        assert!(out.starts_with("ORD-"));
        assert!(out[4..7].chars().all(|c| c.is_ascii_digit()));
        assert!(out[8..10].chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn dice_rolls_stay_in_range() {
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        let out = render(&env, "{{ fakeit_Dice(3, 6) | join(\",\") }}");
        let rolls: Vec<i64> = out.split(',').map(|r| r.parse().unwrap()).collect();
        assert_eq!(rolls.len(), 3);
        assert!(rolls.iter().all(|r| (1..=6).contains(r)));
    }

    #[test]
    fn teams_assign_every_person() {
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        let out = render(
            &env,
            "{{ fakeit_Teams(slice_Str(\"ann\", \"bob\", \"cyd\"), slice_Str(\"red\", \"blue\")) }}",
        );
        for person in ["ann", "bob", "cyd"] {
            assert!(out.contains(person), "{person} unassigned in {out}");
        }
    }

    #[test]
    fn file_base64_roundtrip() {
        let path = std::env::temp_dir().join(format!("sarin-funcs-{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"payload").unwrap();

        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::new(FormDataState::default()),
        );
        let out = render(
            &env,
            &format!("{{{{ file_Base64(\"{}\") }}}}", path.to_string_lossy()),
        );
        assert_eq!(out, BASE64.encode(b"payload"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn form_data_sets_content_type_and_boundary() {
        let state = Arc::new(FormDataState::default());
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::clone(&state),
        );

        let body = render(&env, "{{ body_FormData(\"name\", \"John\") }}");
        let content_type = state.get().unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert!(body.contains(&format!("--{boundary}\r\n")));
        assert!(body.contains("Content-Disposition: form-data; name=\"name\""));
        assert!(body.contains("John"));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn form_data_escaped_at_is_literal() {
        let state = Arc::new(FormDataState::default());
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::clone(&state),
        );
        let body = render(&env, "{{ body_FormData(\"k\", \"@@literal\") }}");
        assert!(body.contains("@literal"));
        assert!(!body.contains("@@literal"));
    }

    #[test]
    fn form_data_odd_args_error() {
        let state = Arc::new(FormDataState::default());
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::clone(&state),
        );
        let tmpl = env.template_from_str("{{ body_FormData(\"only-key\") }}").unwrap();
        assert!(tmpl.render(minijinja::context! {}).is_err());
    }

    #[test]
    fn form_data_embeds_file_part() {
        let path = std::env::temp_dir().join(format!("sarin-part-{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"file-bytes").unwrap();

        let state = Arc::new(FormDataState::default());
        let env = env_with_body(
            Arc::new(FileCache::new(Duration::from_secs(1))),
            Arc::clone(&state),
        );
        let body = render(
            &env,
            &format!(
                "{{{{ body_FormData(\"doc\", \"@{}\") }}}}",
                path.to_string_lossy()
            ),
        );
        let filename = path.file_name().unwrap().to_string_lossy();
        assert!(body.contains(&format!("filename=\"{filename}\"")));
        assert!(body.contains("file-bytes"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn clear_resets_content_type_slot() {
        let state = FormDataState::default();
        state.set("multipart/form-data; boundary=x".to_owned());
        assert!(state.get().is_some());
        state.clear();
        assert!(state.get().is_none());
    }
}
