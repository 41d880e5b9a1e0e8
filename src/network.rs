use log::trace;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::{Directed, Graph};
use std::collections::HashMap;

use crate::{Error, IntersectionId, Time};

/// Streets are addressed by their edge index in the network graph
pub type StreetId = EdgeIndex;

/// A graph node. The incoming and outgoing lists are kept explicitly because
/// petgraph walks adjacency in reverse insertion order, and the schedule needs
/// the order in which streets were added
#[derive(Clone, Debug)]
pub struct Intersection {
    pub id: IntersectionId,
    incoming: Vec<StreetId>,
    outgoing: Vec<StreetId>,
}

impl Intersection {
    fn new(id: IntersectionId) -> Self {
        Intersection {
            id,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn incoming(&self) -> &[StreetId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[StreetId] {
        &self.outgoing
    }
}

/// A directed, named edge between two intersections
/// `transit` counts how often a car passes through the street and is the only
/// field that changes after the network is built
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Street {
    pub name: String,
    pub origin: IntersectionId,
    pub destination: IntersectionId,
    pub length: Time,
    pub transit: u64,
}

/// The street network is the internal representation of a problem instance.
/// The graph doubles as an arena: node index `i` is intersection `i`, and every
/// street is an edge. Lookups by name go through a map built alongside it.
#[derive(Clone, Debug)]
pub struct StreetNetwork {
    graph: Graph<Intersection, Street, Directed>,
    street_ids: HashMap<String, StreetId>,
}

impl StreetNetwork {
    /// Node indices are `u32`, and the largest one is reserved by petgraph
    pub const MAX_INTERSECTIONS: usize = u32::MAX as usize;

    /// Create a network with `intersection_count` intersections and no streets.
    /// Panics if `intersection_count` exceeds `MAX_INTERSECTIONS`.
    pub fn new(intersection_count: usize) -> Self {
        let mut graph: Graph<Intersection, Street, Directed> = Graph::new();
        for id in 0..intersection_count {
            graph.add_node(Intersection::new(id));
        }

        StreetNetwork {
            graph,
            street_ids: HashMap::new(),
        }
    }

    /// Register a street and append it to the outgoing list of `origin` and the
    /// incoming list of `destination`
    pub fn add_street(
        &mut self,
        origin: IntersectionId,
        destination: IntersectionId,
        name: impl Into<String>,
        length: Time,
    ) -> Result<StreetId, Error> {
        let name = name.into();
        let count = self.intersection_count();
        for id in [origin, destination] {
            if id >= count {
                return Err(Error::IntersectionOutOfRange { id, count });
            }
        }
        if length == 0 {
            return Err(Error::InvalidStreetLength { name, length });
        }
        if self.street_ids.contains_key(&name) {
            return Err(Error::DuplicateStreet(name));
        }

        let street = Street {
            name: name.clone(),
            origin,
            destination,
            length,
            transit: 0,
        };
        let street_id = self
            .graph
            .add_edge(NodeIndex::new(origin), NodeIndex::new(destination), street);
        self.graph[NodeIndex::new(origin)].outgoing.push(street_id);
        self.graph[NodeIndex::new(destination)].incoming.push(street_id);
        trace!("Added street {} ({} -> {})", name, origin, destination);
        self.street_ids.insert(name, street_id);

        Ok(street_id)
    }

    pub fn intersection_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn street_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.graph.node_weight(NodeIndex::new(id))
    }

    /// All intersections in ascending id order
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> + '_ {
        self.graph.node_indices().map(move |node| &self.graph[node])
    }

    pub fn street_id(&self, name: &str) -> Option<StreetId> {
        self.street_ids.get(name).copied()
    }

    pub fn street(&self, street_id: StreetId) -> Option<&Street> {
        self.graph.edge_weight(street_id)
    }

    pub(crate) fn street_mut(&mut self, street_id: StreetId) -> Option<&mut Street> {
        self.graph.edge_weight_mut(street_id)
    }

    /// Streets ending at `id`, in the order they were added.
    /// Unknown intersections have no streets.
    pub fn incoming_streets(&self, id: IntersectionId) -> impl Iterator<Item = &Street> + '_ {
        self.streets_of(self.intersection(id).map(Intersection::incoming))
    }

    /// Streets starting at `id`, in the order they were added
    pub fn outgoing_streets(&self, id: IntersectionId) -> impl Iterator<Item = &Street> + '_ {
        self.streets_of(self.intersection(id).map(Intersection::outgoing))
    }

    fn streets_of<'a>(
        &'a self,
        street_ids: Option<&'a [StreetId]>,
    ) -> impl Iterator<Item = &'a Street> + 'a {
        street_ids
            .unwrap_or(&[])
            .iter()
            .map(move |street_id| &self.graph[*street_id])
    }
}
