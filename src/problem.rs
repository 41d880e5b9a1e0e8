use log::debug;
use std::path::Path;
use std::str::FromStr;

use crate::network::{StreetId, StreetNetwork};
use crate::{Error, Time};

/// A fixed route through the network, stored as resolved street ids
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Car {
    path: Vec<StreetId>,
}

impl Car {
    /// Resolve a list of street names against the network
    pub fn from_names<S: AsRef<str>>(network: &StreetNetwork, names: &[S]) -> Result<Self, Error> {
        let path = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                network
                    .street_id(name)
                    .ok_or_else(|| Error::UnknownStreet(name.to_string()))
            })
            .collect::<Result<Vec<StreetId>, Error>>()?;

        Ok(Car { path })
    }

    pub fn path(&self) -> &[StreetId] {
        &self.path
    }

    /// Time the car needs to reach its destination if it never waits at a light.
    /// The car starts at the end of its first street, so that street does not count.
    pub fn travel_time(&self, network: &StreetNetwork) -> Time {
        self.path
            .iter()
            .skip(1)
            .filter_map(|street_id| network.street(*street_id))
            .map(|street| street.length)
            .sum()
    }
}

/// A parsed problem instance
#[derive(Clone, Debug)]
pub struct Problem {
    /// Simulation horizon in seconds
    pub duration: Time,
    /// Points for every car that arrives before the horizon
    pub bonus: u64,
    pub network: StreetNetwork,
    pub cars: Vec<Car>,
}

/// Reads in a problem instance from a file
pub fn read_problem_from_file(path: impl AsRef<Path>) -> Result<Problem, Error> {
    let input = std::fs::read_to_string(path)?;
    input.parse()
}

/// Walks the non-empty lines of the input, keeping the 1-based line numbers
/// for error messages
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Lines {
            inner: input.lines().enumerate(),
            last_line: 0,
        }
    }

    /// The next non-blank line split into tokens
    fn next_tokens(&mut self, what: &str) -> Result<(usize, Vec<&'a str>), Error> {
        for (i, line) in self.inner.by_ref() {
            self.last_line = i + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if !tokens.is_empty() {
                return Ok((i + 1, tokens));
            }
        }
        Err(Error::parse(
            self.last_line + 1,
            format!("unexpected end of input, expected {}", what),
        ))
    }

    fn expect_end(&mut self) -> Result<(), Error> {
        for (i, line) in self.inner.by_ref() {
            if !line.trim().is_empty() {
                return Err(Error::parse(i + 1, "unexpected trailing content"));
            }
        }
        Ok(())
    }
}

fn parse_int<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T, Error> {
    token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid {}: {:?}", what, token)))
}

/// Attach the line number to errors coming from the network
fn at_line(line: usize, error: Error) -> Error {
    match error {
        Error::Parse { .. } => error,
        other => Error::parse(line, other.to_string()),
    }
}

impl FromStr for Problem {
    type Err = Error;

    /// The first line holds `D I S V F`, followed by `S` street lines
    /// (`B E name L`) and `V` car lines (`P name_1 .. name_P`)
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut lines = Lines::new(input);

        let (line, header) = lines.next_tokens("header")?;
        if header.len() != 5 {
            return Err(Error::parse(
                line,
                format!("expected 5 header values, found {}", header.len()),
            ));
        }
        let duration: Time = parse_int(header[0], line, "duration")?;
        let intersection_count: usize = parse_int(header[1], line, "intersection count")?;
        let street_count: usize = parse_int(header[2], line, "street count")?;
        let car_count: usize = parse_int(header[3], line, "car count")?;
        let bonus: u64 = parse_int(header[4], line, "bonus")?;
        if duration == 0 {
            return Err(Error::parse(line, "duration must be at least 1"));
        }
        if intersection_count > StreetNetwork::MAX_INTERSECTIONS {
            return Err(Error::parse(
                line,
                format!(
                    "intersection count {} exceeds the maximum of {}",
                    intersection_count,
                    StreetNetwork::MAX_INTERSECTIONS
                ),
            ));
        }

        let mut network = StreetNetwork::new(intersection_count);
        for _ in 0..street_count {
            let (line, tokens) = lines.next_tokens("street")?;
            if tokens.len() != 4 {
                return Err(Error::parse(
                    line,
                    format!("expected 4 street values, found {}", tokens.len()),
                ));
            }
            let origin = parse_int(tokens[0], line, "origin")?;
            let destination = parse_int(tokens[1], line, "destination")?;
            let length = parse_int(tokens[3], line, "street length")?;
            network
                .add_street(origin, destination, tokens[2], length)
                .map_err(|e| at_line(line, e))?;
        }

        let mut cars = Vec::new();
        for _ in 0..car_count {
            let (line, tokens) = lines.next_tokens("car")?;
            let path_len: usize = parse_int(tokens[0], line, "path length")?;
            if path_len == 0 {
                return Err(Error::parse(line, "car path must contain at least one street"));
            }
            if tokens.len() - 1 != path_len {
                return Err(Error::parse(
                    line,
                    format!(
                        "expected {} streets in car path, found {}",
                        path_len,
                        tokens.len() - 1
                    ),
                ));
            }
            let car = Car::from_names(&network, &tokens[1..]).map_err(|e| at_line(line, e))?;
            cars.push(car);
        }
        lines.expect_end()?;

        debug!(
            "Parsed {} intersections, {} streets, {} cars, duration {}",
            intersection_count, street_count, car_count, duration
        );

        Ok(Problem {
            duration,
            bonus,
            network,
            cars,
        })
    }
}
