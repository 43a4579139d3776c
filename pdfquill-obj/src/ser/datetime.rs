use chrono::{DateTime, TimeZone};
use serde::ser;

use super::NAME_RAW;

/// Serde `with`-module emitting a PDF date string, `(D:YYYYMMDDHHMMSS+HH'MM')`.
pub fn serialize<S, Tz>(date: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: ser::Serializer,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stamp = date.format("%Y%m%d%H%M%S");
    let mut zone = date.format("%z").to_string();
    let minutes = zone.split_off(3);
    serializer.serialize_newtype_struct(NAME_RAW, &format!("(D:{}{}'{}')", stamp, zone, minutes))
}

#[cfg(test)]
mod test {
    use chrono::{FixedOffset, TimeZone};
    use serde::Serialize;

    use crate::to_string;

    #[test]
    fn pdf_date_format() {
        #[derive(Serialize)]
        #[serde(rename = "")]
        struct Test {
            #[serde(with = "crate::datetime")]
            datetime: chrono::DateTime<FixedOffset>,
        }

        let test = Test {
            datetime: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2015, 2, 19, 22, 33, 26)
                .unwrap(),
        };

        assert_eq!(
            to_string(&test).unwrap(),
            "<< /datetime (D:20150219223326+01'00') >>"
        );
    }
}
