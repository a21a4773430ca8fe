//! Built-in book data.

use indexmap::IndexMap;

use super::{Book, LiturgyInfo, MasechetInfo};
use crate::error::CatalogError;

type MasechetRow = (&'static str, &'static str, &'static str, &'static [&'static str], &'static str, &'static str);

/// canonical name, Hebrew name, vocalized Hebrew name, aliases, first amud, last amud
const MASECHTOT: &[MasechetRow] = &[
    ("Arakhin", "ערכין", "עֲרָכִין", &["Arachin"], "2a", "34a"),
    ("Avodah Zarah", "עבודה זרה", "עֲבוֹדָה זָרָה", &["Avoda Zarah", "Avoda Zara", "Avodah Zara"], "2a", "76b"),
    ("Bava Batra", "בבא בתרא", "בָּבָא בָּתְרָא", &["Bava Basra"], "2a", "176b"),
    ("Bava Kamma", "בבא קמא", "בָּבָא קַמָּא", &["Bava Kama"], "2a", "119b"),
    ("Bava Metzia", "בבא מציעא", "בָּבָא מְצִיעָא", &["Bava Metziah", "Bava Metsia", "Bava Metsiah"], "2a", "119a"),
    ("Beitzah", "ביצה", "בֵּיצָה", &["Beitza", "Beitsah", "Beitsa"], "2a", "40b"),
    ("Bekhorot", "בכורות", "בְּכוֹרוֹת", &["Bechorot", "Bechoros", "Bekhoros"], "2a", "61a"),
    ("Berakhot", "ברכות", "בְּרָכוֹת", &["Berachot", "Brachot", "Brakhot", "Berachos", "Brachos", "Brakhos", "Berakhos"], "2a", "64a"),
    ("Chagigah", "חגיגה", "חֲגִיגָה", &["Chagiga", "Khagigah", "Khagiga"], "2a", "27a"),
    ("Chullin", "חולין", "חֻלִּין", &["Chulin", "Hulin", "Hullin"], "2a", "142a"),
    ("Eruvin", "עירובין", "עֵירוּבִין", &["Eiruvin"], "2a", "105a"),
    ("Gittin", "גיטין", "גִּיטִּין", &["Gitin"], "2a", "90b"),
    ("Horayot", "הוריות", "הוֹרָיוֹת", &["Horayos"], "2a", "14a"),
    ("Keritot", "כריתות", "כְּרִיתוֹת", &["Ceritot", "Kritot", "Critot", "Kerisos", "Cerisos", "Krisos", "Crisos"], "2a", "28b"),
    ("Ketubot", "כתובות", "כְּתֻבּוֹת", &["Ktubot", "Kesubos", "Ksubos"], "2a", "112b"),
    ("Kiddushin", "קידושין", "קִדּוּשִׁין", &["Kidushin"], "2a", "82b"),
    ("Makkot", "מכות", "מַכּוֹת", &["Makot", "Macot", "Maccot", "Makos", "Macos", "Maccos", "Makkos"], "2a", "24b"),
    ("Megillah", "מגילה", "מְגִלָּה", &["Megilla", "Megila", "Megilah"], "2a", "32a"),
    ("Meilah", "מעילה", "מְעִילָה", &["Meila"], "2a", "22a"),
    ("Menachot", "מנחות", "מְנָחוֹת", &["Menakhot", "Menachos", "Menakhos"], "2a", "110a"),
    ("Moed Katan", "מועד קטן", "מוֹעֵד קָטָן", &["Moed Catan"], "2a", "29a"),
    ("Nazir", "נזיר", "נָזִיר", &[], "2a", "66b"),
    ("Nedarim", "נדרים", "נְדָרִים", &[], "2a", "91b"),
    ("Niddah", "נדה", "נִדָּה", &["Nidda", "Nidah", "Nida"], "2a", "73a"),
    ("Pesachim", "פסחים", "פְּסָחִים", &["Pesahim"], "2a", "121b"),
    ("Rosh Hashanah", "ראש השנה", "רֹאשׁ הַשָּׁנָה", &["Rosh Hashana", "Rosh Hoshona", "Rosh Hoshonah", "RH"], "2a", "35a"),
    ("Sanhedrin", "סנהדרין", "סַנהֶדרִין", &[], "2a", "113b"),
    ("Shabbat", "שבת", "שַׁבָּת", &["Shabat", "Chabbat", "Chabat", "Shabos", "Chabbos", "Chabos", "Shabbas", "Shabbos"], "2a", "157b"),
    ("Shevuot", "שבועות", "שְׁבוּעוֹת", &["Shevuos"], "2a", "49b"),
    ("Sotah", "סוטה", "סוֹטָה", &["Sota", "Sottah", "Sotta"], "2a", "49b"),
    ("Sukkah", "סוכה", "סֻכָּה", &["Sukka", "Suka", "Succah", "Succa"], "2a", "56b"),
    ("Taanit", "תענית", "תַּעֲנִית", &["Taanit", "Taanis", "Tanit", "Tanis"], "2a", "31a"),
    ("Tamid", "תמיד", "תָּמִיד", &["Tammid"], "25b", "33b"),
    ("Temurah", "תמורה", "תְּמוּרָה", &["Temura"], "2a", "34a"),
    ("Yevamot", "יבמות", "יְבָמוֹת", &["Yevamos"], "2a", "122b"),
    ("Yoma", "יומא", "יוֹמָא", &["Yuma", "Yomah", "Yumah"], "2a", "88a"),
    ("Zevachim", "זבחים", "זְבָחִים", &["Zvachim", "Zevakhim"], "2a", "120b"),
];

/// Yerushalmi Shekalim is requested by halacha, not by amud.
const SHEKALIM_REF_REWRITING: &[(&str, &str)] = &[
    ("2a", "1.1.1-16"),
    ("2b", "1.1.16-35"),
    ("3a", "1.1.35-2.13"),
    ("3b", "1.2.13-4.3"),
    ("4a", "1.4.3-22"),
    ("4b", "1.4.22-35"),
    ("5a", "1.4.35-2.1.13"),
    ("5b", "2.1.13-3.1"),
    ("6a", "2.3.1-4.1"),
    ("6b", "2.4.1-23"),
    ("7a", "2.4.23-5.10"),
    ("7b", "2.5.10-3.1.11"),
    ("8a", "3.1.11-2.5"),
    ("8b", "3.2.5-21"),
    ("9a", "3.2.21-3.5"),
    ("9b", "3.3.5-4.1.2"),
    ("10a", "4.1.2-2.1"),
    ("10b", "4.2.1-15"),
    ("11a", "4.2.15-3.4"),
    ("11b", "4.3.4-4.1"),
    ("12a", "4.4.1-22"),
    ("12b", "4.4.22-42"),
    ("13a", "4.4.42-5.1.10"),
    ("13b", "5.1.10-30"),
    ("14a", "5.1.30-58"),
    ("14b", "5.1.58-3.8"),
    ("15a", "5.3.8-4.18"),
    ("15b", "5.4.18-6.1.14"),
    ("16a", "6.1.14-34"),
    ("16b", "6.1.34-2.1"),
    ("17a", "6.2.1-32"),
    ("17b", "6.2.32-3.14"),
    ("18a", "6.3.14-4.11"),
    ("18b", "6.4.11-31"),
    ("19a", "6.4.31-7.2.5"),
    ("19b", "7.2.5-18"),
    ("20a", "7.2.18-3.13"),
    ("20b", "7.3.13-39"),
    ("21a", "7.3.39-8.1.6"),
    ("21b", "8.1.6-3.2"),
    ("22a", "8.3.2-4.12"),
    ("22b", "8.4.12-15"),
];

/// canonical name, Hebrew name, aliases, chapter count
const TANAKH: &[(&str, &str, &[&str], u32)] = &[
    ("Genesis", "בראשית", &["Bereshit", "Breishit", "Bereishit", "Beresheet", "Bereshith", "Bereishis", "Gen"], 50),
    ("Exodus", "שמות", &["Shmot", "Shemot", "Shemoth", "Shemos", "Ex"], 40),
    ("Leviticus", "ויקרא", &["Vayikra", "Vayikrah", "Vay"], 27),
    ("Numbers", "במדבר", &["Bamidbar", "Bemidbar", "Num"], 36),
    ("Deuteronomy", "דברים", &["Devarim", "Dvarim", "Devorim", "Duet"], 34),
    ("Joshua", "יהושע", &["Yehoshua"], 24),
    ("Judges", "שופטים", &["Shoftim"], 21),
    ("I Samuel", "שמואל א", &["First Samuel", "Shmuel Aleph", "Shmuel Alef", "I Shmuel", "Samuel I", "Shmuel I", "1 Samuel", "I Shemuel", "I. Samuel"], 31),
    ("II Samuel", "שמואל ב", &["Second Samuel", "Shmuel Bet", "Shmuel II", "Samuel II", "II Shmuel", "2 Samuel", "II Shemuel", "II. Samuel"], 24),
    ("I Kings", "מלכים א", &["I Melachim", "Melachim Aleph", "Melachim Alef", "Kings I", "Melachim I", "1 Kings", "First Kings", "I Melakhim", "I. Kings", "מל״א", "מל\"א"], 22),
    ("II Kings", "מלכים ב", &["Melachim Bet", "Melachim II", "Second Kings", "2 Kings", "II Melachim", "Kings II", "II Melakhim", "II. Kings", "מל״ב", "מל\"ב"], 25),
    ("Isaiah", "ישעיהו", &["Isaia", "Yishayahu", "Yeshayahu"], 66),
    ("Jeremiah", "ירמיהו", &["Yirmiyahu", "Yirmiyohu", "Yermiyahu", "Yirmeyahu", "Jer"], 52),
    ("Ezekiel", "יחזקאל", &["Yehezkel", "Yechezkel", "Yechezkiel"], 48),
    ("Hosea", "הושע", &["Hoshea"], 14),
    ("Joel", "יואל", &["Yoel"], 4),
    ("Amos", "עמוס", &[], 9),
    ("Obadiah", "עובדיה", &["Ovadiah", "Ovadyah", "Ovadia", "Ovadya"], 1),
    ("Jonah", "יונה", &["Yonah"], 4),
    ("Micah", "מיכה", &["Mikha", "Michah", "Micha"], 7),
    ("Nahum", "נחום", &["Nachum"], 3),
    ("Habakkuk", "חבקוק", &["Havakkuk", "Habakuk", "Habbakuk"], 3),
    ("Zephaniah", "צפניה", &["Tzephaniah", "Zephania", "Tzephania"], 3),
    ("Haggai", "חגי", &["Chaggai", "Hagai", "Chagai", "Chaggay", "Hagay", "Chagay"], 2),
    ("Zechariah", "זכריה", &["Zachariah", "Zekharia", "Zekharya", "Zecharia", "Zecharyah"], 14),
    ("Malachi", "מלאכי", &["Malakhi"], 3),
    ("Psalms", "תהילים", &["Tehilim", "Psalm", "Tehillim"], 150),
    ("Proverbs", "משלי", &["Mishlei", "Mishle"], 31),
    ("Job", "איוב", &["Iyov", "Iyyov"], 42),
    ("Song of Songs", "שיר השירים", &["Shir HaShirim", "Songs", "Shir haShirim", "Shir Hashirim", "שיה״ש", "שיה\"ש"], 8),
    ("Ruth", "רות", &["Rut"], 4),
    ("Lamentations", "איכה", &["Eichah", "Eicha", "Eikhah", "Eikha"], 5),
    ("Ecclesiastes", "קהלת", &["Kohelet", "Koheleth"], 12),
    ("Esther", "אסתר", &["Ester", "מגילת אסתר"], 10),
    ("Daniel", "דניאל", &["Dan"], 12),
    ("Ezra", "עזרא", &[], 10),
    ("Nehemiah", "נחמיה", &["Nehemia", "Nechemia", "Nechemiah", "Nehemya", "Nechemya", "Nechemyah", "Nehemiya", "Nechemiya", "Nechemiyah", "Neh"], 13),
    ("I Chronicles", "דברי הימים א", &["1 Chronicles", "Chronicles I", "I Divrei HaYamim", "Divrei HaYamim I", "Divrei HaYamim Aleph", "Divrei HaYamim Alef", "First Chronicles", "I Divrei Ha-yamim", "I Divrei Ha-Yamim", "I Divrei Hayomim", "Divre HaYamim I", "Divrei Hayamim I", "דהי״א", "דהי\"א"], 29),
    ("II Chronicles", "דברי הימים ב", &["2 Chronicles", "II Divrei HaYamim", "Second Chronicles", "Chronicles II", "Divrei HaYamim II", "Divrei HaYamim Bet", "II Divrei Ha-yamim", "II Divrei Ha-Yamim", "II Divrei Hayomim", "Divre HaYamim II", "Divrei Hayamim II", "דהי״ב", "דהי\"ב"], 36),
];

/// section name, underlying refs
const BIRKAT_HAMAZON: &[(&str, &[&str])] = &[
    ("Shir Hama'alot", &["Psalms 126:1-6"]),
    ("Zimun", &["Siddur Ashkenaz, Berachot, Birkat HaMazon 6-20"]),
    ("Birkat Hamazon", &["Siddur Ashkenaz, Berachot, Birkat HaMazon 21-81"]),
];

pub(super) fn builtin_books() -> Result<Vec<Book>, CatalogError> {
    let mut books = Vec::new();

    for &(name, hebrew, vocalized, aliases, start, end) in MASECHTOT {
        let info = MasechetInfo {
            vocalized_name: vocalized.to_string(),
            ..MasechetInfo::default()
        };
        books.push(Book::masechet(name, hebrew, aliases, start, end, info)?);
    }

    let shekalim = MasechetInfo {
        vocalized_name: "שְׁקָלִים".to_string(),
        book_name_for_ref: Some("Jerusalem Talmud Shekalim".to_string()),
        ref_rewriting: SHEKALIM_REF_REWRITING
            .iter()
            .map(|&(amud, location)| (amud.to_string(), location.to_string()))
            .collect(),
    };
    books.push(Book::masechet("Shekalim", "שקלים", &["Yerushalmi Shekalim"], "2a", "22b", shekalim)?);

    for &(name, hebrew, aliases, chapters) in TANAKH {
        books.push(Book::bible(name, hebrew, aliases, chapters));
    }

    let sections: IndexMap<String, Vec<String>> = BIRKAT_HAMAZON
        .iter()
        .map(|&(section, refs)| {
            (section.to_string(), refs.iter().map(ToString::to_string).collect())
        })
        .collect();
    books.push(Book::liturgy(
        "BirkatHamazon",
        "ברכת המזון",
        &[],
        LiturgyInfo {
            book_name_for_ref: "Siddur Ashkenaz, Berachot, Birkat HaMazon,".to_string(),
            sections,
        },
    ));

    books.push(Book::synthetic("WeekdayTorah", "WeekdayTorah", &[]));

    Ok(books)
}
