use proptest::prelude::*;
use vcon::script::{quote, Evaluator, Value};
use vcon::terminal::CaptureTerminal;

fn evaluator() -> Evaluator {
    let (term, _) = CaptureTerminal::new();
    Evaluator::new(Box::new(term))
}

/// Arguments the tokenizer produced for `list ARGS`.
fn words(ev: &mut Evaluator, args: &str) -> Vec<Value> {
    match ev.evaluate_string(&format!("list {args}")) {
        Ok(Some(Value::List(items))) => items,
        other => panic!("unexpected result for {args:?}: {other:?}"),
    }
}

proptest! {
    /// Any NUL-free text survives quoting as exactly one argument, even
    /// with variables set that it might otherwise expand.
    #[test]
    fn quote_round_trips(s in "[^\\x00]*") {
        let mut ev = evaluator();
        ev.env_mut().set_new("x", "EXPANDED".into()).unwrap();
        prop_assert_eq!(words(&mut ev, &quote(&s)), vec![Value::Str(s)]);
    }

    /// Brace content without braces or quotes is taken verbatim, however
    /// deeply it is nested.
    #[test]
    fn brace_verbatim(body in "[a-z $\\\\<|#]{0,20}", depth in 1usize..6) {
        let mut ev = evaluator();
        let inner = format!("{}{}{}", "{".repeat(depth - 1), body, "}".repeat(depth - 1));
        let got = words(&mut ev, &format!("{{{inner}}}"));
        prop_assert_eq!(got, vec![Value::Str(inner)]);
    }

    /// The tokenizer returns a result or an error for any input; it never
    /// panics.
    #[test]
    fn parser_does_not_panic(s in "\\PC*") {
        let mut ev = evaluator();
        let _ = ev.evaluate_string(&s);
    }

    /// Integers coerce to booleans by value; any non-empty text is true.
    #[test]
    fn bool_coercion(n in any::<i64>(), s in "\\PC*") {
        prop_assert_eq!(Value::Int(n).as_bool(), n != 0);
        prop_assert!(Value::Str(n.to_string()).as_bool());
        prop_assert_eq!(Value::Str(s.clone()).as_bool(), !s.is_empty());
    }

    /// `foreach` leaves the loop variable exactly as it found it.
    #[test]
    fn foreach_restores_scope(
        items in prop::collection::vec("[a-z]{1,5}", 0..6),
        preset in any::<bool>(),
    ) {
        let mut ev = evaluator();
        if preset {
            ev.env_mut().set_new("v", "before".into()).unwrap();
        }
        let list = items.join(" ");
        let _ = ev.evaluate_string(&format!("foreach v {{echo $v}} {list}"));
        let _ = ev.evaluate_string(&format!("foreach v {{int $v}} {list}"));
        let expected = preset.then(|| Value::from("before"));
        prop_assert_eq!(ev.env().get("v").cloned(), expected);
    }

    /// Piping a list appends one argument per element.
    #[test]
    fn pipe_flattens_lists(items in prop::collection::vec("[a-z0-9]{1,4}", 0..8)) {
        let mut ev = evaluator();
        let got = ev.evaluate_string(&format!("list {} | list", items.join(" "))).unwrap();
        let expected: Vec<Value> = items.into_iter().map(Value::Str).collect();
        prop_assert_eq!(got, Some(Value::List(expected)));
    }
}
