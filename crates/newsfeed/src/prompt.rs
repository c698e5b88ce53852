//! Interactive entry of records and city coordinates.
//!
//! Every prompt repeats until the answer is valid. Reaching the end of
//! input is an error, so piping a short script never loops forever.

use std::io::{self, BufRead, Write};
use std::str::FromStr as _;

use newsfeed_core::geo::{Coordinates, CoordinatesError};
use newsfeed_core::{
    News, PrivateAd, Record, RecordError, RecordKind, Severity, WeatherAlert, parse_date,
};
use rand::Rng;
use snafu::{ResultExt as _, Snafu};
use time::{Date, OffsetDateTime};

#[derive(Debug, Snafu)]
pub enum PromptError {
    #[snafu(display("Terminal I/O failed"))]
    Io { source: io::Error },
    #[snafu(display("Input ended before all answers were given"))]
    Eof,
    #[snafu(display("Invalid record"))]
    Invalid { source: RecordError },
    #[snafu(display("Invalid coordinates"))]
    InvalidCoordinates { source: CoordinatesError },
}

pub type PromptResult<T> = std::result::Result<T, PromptError>;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R, W> Prompter<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask once and return the trimmed answer.
    pub fn ask(&mut self, question: &str) -> PromptResult<String> {
        write!(self.output, "{question}").context(IoSnafu)?;
        self.output.flush().context(IoSnafu)?;

        let mut line = String::new();
        if self.input.read_line(&mut line).context(IoSnafu)? == 0 {
            return Err(PromptError::Eof);
        }
        Ok(line.trim().to_owned())
    }

    fn say(&mut self, msg: &str) -> PromptResult<()> {
        writeln!(self.output, "{msg}").context(IoSnafu)
    }

    /// Ask until `parse` accepts the answer, printing its complaint otherwise.
    pub fn ask_until<T>(
        &mut self,
        question: &str,
        mut parse: impl FnMut(&str) -> Result<T, String>,
    ) -> PromptResult<T> {
        loop {
            let answer = self.ask(question)?;
            match parse(&answer) {
                Ok(v) => return Ok(v),
                Err(complaint) => self.say(&complaint)?,
            }
        }
    }

    pub fn ask_non_empty(&mut self, question: &str, what: &str) -> PromptResult<String> {
        self.ask_until(question, |s| {
            if s.is_empty() {
                Err(format!("{what} cannot be empty. Please try again."))
            } else {
                Ok(s.to_owned())
            }
        })
    }

    /// Yes/no question, `default` on an empty answer.
    pub fn confirm(&mut self, question: &str, default: bool) -> PromptResult<bool> {
        self.ask_until(question, |s| match s.to_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err("Please answer y or n.".to_owned()),
        })
    }

    pub fn news(&mut self) -> PromptResult<News> {
        let text = self.ask_non_empty("Enter news text: ", "Text")?;
        let city = self.ask_non_empty("Enter city where news happened: ", "City")?;
        News::new(&text, &city).context(InvalidSnafu)
    }

    /// Private ad whose expiration date is not before `today`.
    pub fn private_ad(&mut self, today: Date) -> PromptResult<PrivateAd> {
        let text = self.ask_non_empty("Enter ad text: ", "Text")?;
        let expiration_date = self.ask_until("Enter expiration date (YYYY-MM-DD): ", |s| {
            let date = parse_date(s)
                .map_err(|_| "Invalid date format. Please use YYYY-MM-DD.".to_owned())?;
            if date < today {
                return Err("Expiration date cannot be in the past. Please try again.".to_owned());
            }
            Ok(date)
        })?;
        PrivateAd::new(&text, expiration_date).context(InvalidSnafu)
    }

    pub fn weather_alert(&mut self, rng: &mut (impl Rng + ?Sized)) -> PromptResult<WeatherAlert> {
        let text = self.ask_non_empty("Enter alert text: ", "Text")?;
        let question = format!(
            "Enter alert severity level ({}): ",
            Severity::ALL.map(Severity::as_str).join(", ")
        );
        let severity = self.ask_until(&question, |s| {
            Severity::from_str(s).map_err(|err| err.to_string())
        })?;
        let location = self.ask_non_empty("Enter location for weather alert: ", "Location")?;
        WeatherAlert::new_with_rng(
            &text,
            severity.as_str(),
            &location,
            OffsetDateTime::now_utc(),
            rng,
        )
        .context(InvalidSnafu)
    }

    pub fn record(
        &mut self,
        kind: RecordKind,
        today: Date,
        rng: &mut (impl Rng + ?Sized),
    ) -> PromptResult<Record> {
        Ok(match kind {
            RecordKind::News => self.news()?.into(),
            RecordKind::PrivateAd => self.private_ad(today)?.into(),
            RecordKind::WeatherAlert => self.weather_alert(rng)?.into(),
        })
    }

    /// Coordinates and optional country for a city the store does not know.
    pub fn city_details(&mut self, city: &str) -> PromptResult<(Coordinates, Option<String>)> {
        self.say(&format!("City '{city}' not found in database."))?;
        self.say("Please provide coordinates for this city.")?;

        let latitude = self.ask_until(
            &format!("Enter latitude for {city} (-90 to 90): "),
            |s| parse_degrees(s, "Latitude", 90.0),
        )?;
        let longitude = self.ask_until(
            &format!("Enter longitude for {city} (-180 to 180): "),
            |s| parse_degrees(s, "Longitude", 180.0),
        )?;
        let country = self.ask(&format!("Enter country for {city} (optional): "))?;

        let coordinates = Coordinates::new(latitude, longitude).context(InvalidCoordinatesSnafu)?;
        Ok((coordinates, Some(country).filter(|c| !c.is_empty())))
    }
}

fn parse_degrees(s: &str, what: &str, max: f64) -> Result<f64, String> {
    if s.is_empty() {
        return Err(format!("{what} cannot be empty. Please try again."));
    }
    let value: f64 = s.parse().map_err(|_| {
        format!(
            "Invalid {} format. Please enter a valid number.",
            what.to_lowercase()
        )
    })?;
    if !(-max..=max).contains(&value) {
        return Err(format!("{what} must be between -{max} and {max}. Please try again."));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;
    use time::macros::date;

    use super::*;

    fn prompter(input: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter::new(input.as_bytes(), vec![])
    }

    #[test]
    fn news_reprompts_on_empty_answers() {
        let mut p = prompter("\n  \nFire downtown\n\nSpringfield\n");
        let news = p.news().unwrap();
        assert_eq!(news.text(), "Fire downtown");
        assert_eq!(news.city(), "Springfield");

        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out.matches("Text cannot be empty").count(), 2);
        assert_eq!(out.matches("City cannot be empty").count(), 1);
    }

    #[test]
    fn private_ad_rejects_bad_and_past_dates() {
        let mut p = prompter("Bike\n2024/01/01\n2024-05-31\n2024-06-01\n");
        let ad = p.private_ad(date!(2024 - 06 - 01)).unwrap();
        assert_eq!(ad.expiration_date(), date!(2024 - 06 - 01));

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Invalid date format"));
        assert!(out.contains("cannot be in the past"));
    }

    #[test]
    fn weather_alert_normalizes_severity() {
        let mut p = prompter("Storm\nextreme\nhIGH\nCoast\n");
        let alert = p.weather_alert(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(alert.severity(), "High");
        assert_eq!(alert.location(), "Coast");
        assert!(alert.alert_id().starts_with("WA-"));

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Unknown severity 'extreme'"));
    }

    #[test]
    fn city_details_validates_ranges() {
        let mut p = prompter("abc\n91\n50.45\n-181\n30.52\n  \n");
        let (coords, country) = p.city_details("Kyiv").unwrap();
        assert_eq!(coords, Coordinates::new(50.45, 30.52).unwrap());
        assert_eq!(country, None);

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Invalid latitude format"));
        assert!(out.contains("Latitude must be between -90 and 90"));
        assert!(out.contains("Longitude must be between -180 and 180"));
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut p = prompter("only text\n");
        assert!(matches!(p.news(), Err(PromptError::Eof)));
    }

    #[test]
    fn confirm_defaults_on_empty() {
        let mut p = prompter("\nmaybe\nN\n");
        assert!(p.confirm("Save? ", true).unwrap());
        assert!(!p.confirm("Save? ", true).unwrap());
    }
}
