// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASN.1 time primitives shared by multiple RFCs.

use {
    bcder::{
        decode::{Constructed, DecodeError, Primitive, Source},
        encode::{PrimitiveContent, Values},
        Mode, Tag,
    },
    chrono::{Datelike, TimeZone, Timelike},
    std::{io::Write, ops::Deref, str::FromStr},
};

/// Time variant.
///
/// ```ASN.1
/// Time ::= CHOICE {
///   utcTime UTCTime,
///   generalizedTime GeneralizedTime }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Time {
    UtcTime(UtcTime),
    GeneralizedTime(GeneralizedTime),
}

impl Time {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        if let Some(utc) =
            cons.take_opt_primitive_if(Tag::UTC_TIME, |prim| UtcTime::from_primitive(prim))?
        {
            Ok(Self::UtcTime(utc))
        } else if let Some(generalized) =
            cons.take_opt_primitive_if(Tag::GENERALIZED_TIME, |prim| {
                GeneralizedTime::from_primitive(prim)
            })?
        {
            Ok(Self::GeneralizedTime(generalized))
        } else {
            Err(cons.content_err("expected UTCTime or GeneralizedTime"))
        }
    }

    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        if let Some(utc) =
            cons.take_opt_primitive_if(Tag::UTC_TIME, |prim| UtcTime::from_primitive(prim))?
        {
            Ok(Some(Self::UtcTime(utc)))
        } else if let Some(generalized) =
            cons.take_opt_primitive_if(Tag::GENERALIZED_TIME, |prim| {
                GeneralizedTime::from_primitive(prim)
            })?
        {
            Ok(Some(Self::GeneralizedTime(generalized)))
        } else {
            Ok(None)
        }
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        match self {
            Self::UtcTime(utc) => (Some(utc.encode()), None),
            Self::GeneralizedTime(gt) => (None, Some(gt.encode())),
        }
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Time {
    fn from(t: chrono::DateTime<chrono::Utc>) -> Self {
        Self::UtcTime(UtcTime::from_datetime(t))
    }
}

impl From<Time> for chrono::DateTime<chrono::Utc> {
    fn from(t: Time) -> Self {
        match t {
            Time::UtcTime(utc) => *utc,
            Time::GeneralizedTime(gt) => gt.into(),
        }
    }
}

/// GeneralizedTime, restricted to the `YYYYMMDDHHMMSSZ` form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneralizedTime(chrono::DateTime<chrono::Utc>);

impl GeneralizedTime {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::GENERALIZED_TIME, |prim| Self::from_primitive(prim))
    }

    pub fn from_primitive<S: Source>(
        prim: &mut Primitive<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        let data = prim.take_all()?;

        Self::parse(data.as_ref()).map_err(|e| prim.content_err(e))
    }

    /// Parse GeneralizedTime string data.
    pub fn parse(data: &[u8]) -> Result<Self, &'static str> {
        const MALFORMED: &str = "malformed GeneralizedTime";

        if data.len() != "YYYYMMDDHHMMSSZ".len() {
            return Err(MALFORMED);
        }

        if data[14] != b'Z' {
            return Err(MALFORMED);
        }

        let digits = std::str::from_utf8(&data[0..14]).map_err(|_| MALFORMED)?;

        let year = i32::from_str(&digits[0..4]).map_err(|_| MALFORMED)?;
        let month = u32::from_str(&digits[4..6]).map_err(|_| MALFORMED)?;
        let day = u32::from_str(&digits[6..8]).map_err(|_| MALFORMED)?;
        let hour = u32::from_str(&digits[8..10]).map_err(|_| MALFORMED)?;
        let minute = u32::from_str(&digits[10..12]).map_err(|_| MALFORMED)?;
        let second = u32::from_str(&digits[12..14]).map_err(|_| MALFORMED)?;

        if let chrono::LocalResult::Single(date) = chrono::Utc.ymd_opt(year, month, day) {
            if let Some(dt) = date.and_hms_opt(hour, minute, second) {
                return Ok(Self(dt));
            }
        }

        Err(MALFORMED)
    }
}

impl ToString for GeneralizedTime {
    fn to_string(&self) -> String {
        format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second(),
        )
    }
}

impl Deref for GeneralizedTime {
    type Target = chrono::DateTime<chrono::Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<GeneralizedTime> for chrono::DateTime<chrono::Utc> {
    fn from(gt: GeneralizedTime) -> Self {
        gt.0
    }
}

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        self.to_string().len()
    }

    fn write_encoded<W: Write>(&self, _: Mode, target: &mut W) -> Result<(), std::io::Error> {
        target.write_all(self.to_string().as_bytes())
    }
}

/// UTCTime, restricted to the `YYMMDDHHMMSSZ` form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UtcTime(chrono::DateTime<chrono::Utc>);

impl UtcTime {
    /// Obtain a new instance with now as the time.
    pub fn now() -> Self {
        Self::from_datetime(chrono::Utc::now())
    }

    /// Construct from an arbitrary UTC time.
    ///
    /// Sub-second precision is dropped since the encoding cannot express it.
    pub fn from_datetime(t: chrono::DateTime<chrono::Utc>) -> Self {
        let t = chrono::Utc
            .ymd(t.year(), t.month(), t.day())
            .and_hms(t.hour(), t.minute(), t.second());

        Self(t)
    }

    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::UTC_TIME, |prim| Self::from_primitive(prim))
    }

    pub fn from_primitive<S: Source>(
        prim: &mut Primitive<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        let data = prim.take_all()?;

        Self::parse(data.as_ref()).map_err(|e| prim.content_err(e))
    }

    /// Parse UTCTime string data.
    pub fn parse(data: &[u8]) -> Result<Self, &'static str> {
        const MALFORMED: &str = "malformed UTCTime";

        if data.len() != "YYMMDDHHMMSSZ".len() {
            return Err(MALFORMED);
        }

        if data[12] != b'Z' {
            return Err(MALFORMED);
        }

        let digits = std::str::from_utf8(&data[0..12]).map_err(|_| MALFORMED)?;

        let year = i32::from_str(&digits[0..2]).map_err(|_| MALFORMED)?;
        let year = if year >= 50 { year + 1900 } else { year + 2000 };

        let month = u32::from_str(&digits[2..4]).map_err(|_| MALFORMED)?;
        let day = u32::from_str(&digits[4..6]).map_err(|_| MALFORMED)?;
        let hour = u32::from_str(&digits[6..8]).map_err(|_| MALFORMED)?;
        let minute = u32::from_str(&digits[8..10]).map_err(|_| MALFORMED)?;
        let second = u32::from_str(&digits[10..12]).map_err(|_| MALFORMED)?;

        if let chrono::LocalResult::Single(date) = chrono::Utc.ymd_opt(year, month, day) {
            if let Some(dt) = date.and_hms_opt(hour, minute, second) {
                return Ok(Self(dt));
            }
        }

        Err(MALFORMED)
    }
}

impl ToString for UtcTime {
    fn to_string(&self) -> String {
        format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100,
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }
}

impl Deref for UtcTime {
    type Target = chrono::DateTime<chrono::Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        self.to_string().len()
    }

    fn write_encoded<W: Write>(&self, _: Mode, target: &mut W) -> Result<(), std::io::Error> {
        target.write_all(self.to_string().as_bytes())
    }
}
