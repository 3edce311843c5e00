#[cfg(test)]
mod test {
    use admg::util::nodeset;
    use admg::{d_separated, districts, local_markov, Admg, GraphError, NodeSet};
    use rstest::rstest;

    fn load(name: &str) -> Admg {
        Admg::from_file(format!("../graphs/{name}.grapl"))
            .unwrap_or_else(|e| panic!("Failed to load graph {name}: {e}"))
    }

    #[test]
    fn cyclic() {
        let g = load("cyclic_graph");
        assert!(!g.is_dag());
        assert_eq!(g.topsort(), Err(GraphError::Cyclic));
        assert_eq!(local_markov(&g), Err(GraphError::Cyclic));
    }

    #[rstest]
    #[case("backdoor")]
    #[case("symptoms")]
    #[case("bareinboim_2020")]
    #[case("richardson_2017")]
    #[case("complex_dag")]
    #[case("markov1")]
    #[case("two_confounders")]
    fn topological_order(#[case] name: &str) {
        let g = load(name);
        assert!(g.is_dag());
        let order = g.topsort().unwrap();
        let as_set: NodeSet = order.iter().cloned().collect();
        assert_eq!(&as_set, g.nodes());
        for (i, n) in order.iter().enumerate() {
            for p in g.pa([n]) {
                assert!(order[..i].contains(&p), "{p} should come before {n}");
            }
        }
    }

    #[rstest]
    #[case("bareinboim_2020")]
    #[case("richardson_2017")]
    #[case("two_confounders")]
    #[case("front_door")]
    fn districts_partition(#[case] name: &str) {
        let g = load(name);
        let ds = districts(&g, g.nodes()).unwrap();
        let mut union = NodeSet::new();
        for d in &ds {
            assert!(!d.is_empty());
            assert!(union.is_disjoint(d));
            union.extend(d.iter().cloned());
        }
        assert_eq!(&union, g.nodes());
    }

    #[test]
    fn bareinboim() {
        let g = load("bareinboim_2020");
        assert!(g.is_dag());
        assert!(g.has_latent());
        for d in [
            nodeset(["A"]),
            nodeset(["F"]),
            nodeset(["B", "D"]),
            nodeset(["C", "E"]),
        ] {
            assert!(g.districts().contains(&d));
        }
        assert!(g.an(&nodeset(["D"])).is_superset(&nodeset(["A", "B", "C", "D"])));
        assert!(g.de(&nodeset(["B", "F"])).is_superset(&nodeset(["B", "D", "E", "F"])));
    }

    #[rstest]
    #[case("D", &["I", "S"])]
    #[case("G", &["D", "I", "S"])]
    #[case("L", &["D", "G", "I", "S"])]
    #[case("S", &["D", "G", "I", "L"])]
    #[case("I", &["D"])]
    fn non_descendants(#[case] n: &str, #[case] expected: &[&str]) {
        let g = load("markov1");
        assert_eq!(g.nd(&nodeset([n])), nodeset(expected.iter().copied()));
    }

    #[test]
    fn symptoms() {
        let g = load("symptoms");
        assert_eq!(
            g.topsort().unwrap(),
            vec!["Allergy", "Flu", "Sinus", "Headache", "Nose"]
        );
        assert_eq!(
            g.an(&nodeset(["Headache"])),
            nodeset(["Allergy", "Flu", "Headache", "Sinus"])
        );

        let lm: Vec<String> = local_markov(&g)
            .unwrap()
            .iter()
            .map(|ci| ci.to_string())
            .collect();
        assert!(lm.contains(&"(Headache\u{22a5}Allergy,Flu,Nose|Sinus)".to_string()));
        assert!(lm.contains(&"(Allergy\u{22a5}Flu)".to_string()));

        for ci in local_markov(&g).unwrap() {
            assert_eq!(d_separated(&g, &ci.x, &ci.y, &ci.z), Ok(true));
        }
    }

    #[test]
    fn text_roundtrip() {
        for name in ["front_door", "bareinboim_2020", "symptoms"] {
            let g = load(name);
            assert_eq!(Admg::from_grapl(&g.to_grapl()).unwrap(), g);
        }
    }
}
