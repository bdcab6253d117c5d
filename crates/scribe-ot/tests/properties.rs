//! Property tests for the transform model.

use proptest::prelude::*;
use scribe_ot::{Model, OtError, Transform};
use std::time::Duration;

const RETENTION: Duration = Duration::from_secs(60);

/// An edit expressed relative to whatever content exists when it is built.
#[derive(Debug, Clone)]
struct Edit {
    at: usize,
    delete: usize,
    insert: String,
    lag: u64,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    (0usize..64, 0usize..8, "[a-zé ]{0,6}", 0u64..4).prop_map(|(at, delete, insert, lag)| Edit {
        at,
        delete,
        insert,
        lag,
    })
}

proptest! {
    #[test]
    fn versions_strictly_increase(edits in prop::collection::vec(edit_strategy(), 1..40)) {
        let mut content = String::from("the quick brown fox");
        let mut model = Model::new("prop");
        model.flush(&mut content, RETENTION).unwrap();
        let mut last = model.version();
        let mut length = content.chars().count();

        for edit in edits {
            let position = edit.at.min(length);
            let delete = edit.delete.min(length - position);
            let version = (model.version() + 1).saturating_sub(edit.lag).max(1);
            let ot = Transform::new(position as i64, delete as i64, edit.insert, version);

            match model.push(ot) {
                Ok((fixed, version)) => {
                    prop_assert_eq!(version, last + 1);
                    prop_assert_eq!(fixed.version, version);
                    last = version;
                    length = (length as i64 + fixed.length_delta()) as usize;
                }
                Err(err) => {
                    prop_assert!(matches!(err, OtError::StaleVersion { .. } | OtError::OutOfBounds { .. }), "unexpected error: {:?}", err);
                    prop_assert_eq!(model.version(), last);
                }
            }
        }

        model.flush(&mut content, RETENTION).unwrap();
        prop_assert_eq!(content.chars().count(), length);
    }

    #[test]
    fn up_to_date_edits_always_apply(edits in prop::collection::vec(edit_strategy(), 1..40)) {
        let mut content = String::from("hello world");
        let mut model = Model::new("prop");
        let mut expected = content.clone();

        for edit in edits {
            let length = expected.chars().count();
            let position = edit.at.min(length);
            let delete = edit.delete.min(length - position);
            let ot = Transform::new(position as i64, delete as i64, edit.insert, model.version() + 1);

            ot.apply(&mut expected).unwrap();
            model.push(ot).unwrap();
        }

        model.flush(&mut content, RETENTION).unwrap();
        prop_assert_eq!(content, expected);
    }
}
