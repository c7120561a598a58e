//! Assemblage des anneaux shapefile en polygones avec trous

use geo::{Contains, LineString, Point, Polygon};
use tracing::warn;

/// Rattache chaque anneau intérieur au premier anneau extérieur qui le contient
///
/// Un trou orphelin (contenu par aucun extérieur) devient un polygone à part
/// entière plutôt que d'être perdu.
pub fn assemble(outers: Vec<LineString<f64>>, inners: Vec<LineString<f64>>) -> Vec<Polygon<f64>> {
    let shells: Vec<Polygon<f64>> = outers
        .into_iter()
        .map(|ring| Polygon::new(ring, vec![]))
        .collect();

    let mut holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
    let mut orphans = Vec::new();

    for inner in inners {
        let Some(first) = inner.0.first() else {
            continue;
        };
        let point = Point::new(first.x, first.y);

        match shells.iter().position(|shell| shell.contains(&point)) {
            Some(i) => holes[i].push(inner),
            None => orphans.push(inner),
        }
    }

    if !orphans.is_empty() {
        warn!(count = orphans.len(), "Inner rings outside any shell, kept as polygons");
    }

    shells
        .into_iter()
        .zip(holes)
        .map(|(shell, holes)| {
            let (exterior, _) = shell.into_inner();
            Polygon::new(exterior, holes)
        })
        .chain(orphans.into_iter().map(|ring| Polygon::new(ring, vec![])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> LineString<f64> {
        LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ])
    }

    #[test]
    fn test_single_shell() {
        let polygons = assemble(vec![square(0.0, 0.0, 1.0)], vec![]);
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].interiors().is_empty());
    }

    #[test]
    fn test_hole_goes_to_containing_shell() {
        let polygons = assemble(
            vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 4.0)],
            vec![square(6.0, 6.0, 1.0)],
        );
        assert_eq!(polygons.len(), 2);
        assert!(polygons[0].interiors().is_empty());
        assert_eq!(polygons[1].interiors().len(), 1);
    }

    #[test]
    fn test_orphan_hole_is_kept() {
        let polygons = assemble(vec![square(0.0, 0.0, 1.0)], vec![square(10.0, 10.0, 1.0)]);
        assert_eq!(polygons.len(), 2);
    }
}
