use log::debug;

use crate::network::StreetNetwork;
use crate::problem::Car;
use crate::Error;

/// Count, for every street, how many times the cars pass through it.
/// Every occurrence in every path counts, including repeats within one path.
/// Returns the total number of increments.
pub fn aggregate_demand(network: &mut StreetNetwork, cars: &[Car]) -> Result<u64, Error> {
    let mut increments: u64 = 0;
    for car in cars {
        for street_id in car.path() {
            let street = network
                .street_mut(*street_id)
                .ok_or(Error::StreetOutOfRange(street_id.index()))?;
            street.transit += 1;
            increments += 1;
        }
    }
    debug!(
        "Aggregated {} street crossings from {} cars",
        increments,
        cars.len()
    );

    Ok(increments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transit(network: &StreetNetwork, name: &str) -> u64 {
        let street_id = network.street_id(name).unwrap();
        network.street(street_id).unwrap().transit
    }

    #[test]
    fn test_counts_every_occurrence() {
        let mut network = StreetNetwork::new(3);
        network.add_street(0, 1, "a", 1).unwrap();
        network.add_street(1, 2, "b", 1).unwrap();
        network.add_street(2, 0, "c", 1).unwrap();

        let cars = vec![
            Car::from_names(&network, &["a", "b", "c", "a"]).unwrap(),
            Car::from_names(&network, &["b"]).unwrap(),
        ];
        let increments = aggregate_demand(&mut network, &cars).unwrap();

        assert_eq!(increments, 5);
        assert_eq!(transit(&network, "a"), 2);
        assert_eq!(transit(&network, "b"), 2);
        assert_eq!(transit(&network, "c"), 1);
    }

    #[test]
    fn test_only_transit_changes() {
        let mut network = StreetNetwork::new(2);
        network.add_street(0, 1, "a", 7).unwrap();
        let cars = vec![Car::from_names(&network, &["a"]).unwrap()];
        aggregate_demand(&mut network, &cars).unwrap();

        let street = network.street(network.street_id("a").unwrap()).unwrap();
        assert_eq!(street.origin, 0);
        assert_eq!(street.destination, 1);
        assert_eq!(street.length, 7);
        assert_eq!(street.transit, 1);
    }

    #[test]
    fn test_no_cars_leaves_counters_untouched() {
        let mut network = StreetNetwork::new(2);
        network.add_street(0, 1, "a", 1).unwrap();
        assert_eq!(aggregate_demand(&mut network, &[]).unwrap(), 0);
        assert_eq!(transit(&network, "a"), 0);
    }

    #[test]
    fn test_car_from_other_network_is_rejected() {
        let mut big = StreetNetwork::new(2);
        big.add_street(0, 1, "a", 1).unwrap();
        big.add_street(1, 0, "b", 1).unwrap();
        let car = Car::from_names(&big, &["b"]).unwrap();

        let mut small = StreetNetwork::new(2);
        small.add_street(0, 1, "a", 1).unwrap();
        let result = aggregate_demand(&mut small, &[car]);
        assert!(matches!(result, Err(Error::StreetOutOfRange(1))));
    }

    #[test]
    fn test_unknown_street_name() {
        let network = StreetNetwork::new(1);
        let result = Car::from_names(&network, &["nowhere"]);
        assert!(matches!(result, Err(Error::UnknownStreet(name)) if name == "nowhere"));
    }
}
