// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use swid_core::{relativize, ResourceCollection};

fn segment() -> impl Strategy<Value = String> {
    "[abc]{1,2}"
}

fn apply(start: &[String], steps: &[String]) -> Vec<String> {
    let mut at = start.to_vec();
    for step in steps {
        if step == ".." {
            at.pop();
        } else {
            at.push(step.clone());
        }
    }
    at
}

proptest! {
    #[test]
    fn walking_the_result_reaches_the_target(
        dir in prop::collection::vec(segment(), 0..5),
        file in segment(),
        target in prop::collection::vec(segment(), 1..5),
    ) {
        let base = if dir.is_empty() { file.clone() } else { format!("{}/{file}", dir.join("/")) };
        let steps = relativize(&base, &target.join("/"));
        prop_assert_eq!(apply(&dir, &steps), target);
    }

    #[test]
    fn ascents_only_lead(
        dir in prop::collection::vec(segment(), 0..5),
        target in prop::collection::vec(segment(), 0..5),
    ) {
        let base = format!("{}/", dir.join("/"));
        let steps = relativize(&base, &target.join("/"));
        let ups = steps.iter().take_while(|s| *s == "..").count();
        prop_assert!(steps[ups..].iter().all(|s| s != ".."));
        prop_assert!(ups <= dir.len());
    }

    #[test]
    fn inserted_files_share_directories(
        paths in prop::collection::vec(prop::collection::vec(segment(), 1..4), 1..12),
    ) {
        let mut collection = ResourceCollection::new();
        for path in &paths {
            collection.insert_file(path.as_slice()).unwrap();
        }
        let mut roots: Vec<&str> = paths
            .iter()
            .filter(|p| p.len() > 1)
            .map(|p| p[0].as_str())
            .collect();
        roots.sort_unstable();
        roots.dedup();
        prop_assert_eq!(collection.directories().len(), roots.len());
    }
}

#[test]
fn documented_cases() {
    assert_eq!(relativize("a/b/c", "a/b/d"), ["d"]);
    assert_eq!(relativize("a/b/", "a/b/x/y"), ["x", "y"]);
    assert_eq!(relativize("a/b/c", "x/y"), ["..", "..", "x", "y"]);
    assert!(relativize("a/b/", "a/b/").is_empty());
}

#[test]
fn lib_jars_share_one_directory() {
    let mut collection = ResourceCollection::new();
    collection.insert_file(&["lib", "a.jar"]).unwrap();
    collection.insert_file(&["lib", "b.jar"]).unwrap();
    assert_eq!(collection.directories().len(), 1);
    let lib = &collection.directories()[0];
    assert_eq!(lib.name(), "lib");
    assert_eq!(lib.files().len(), 2);
}
