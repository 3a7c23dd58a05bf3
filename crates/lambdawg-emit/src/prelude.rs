// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The runtime prelude prepended to every emitted artifact.
//!
//! `Error` is destructured over the global of the same name, so the
//! JavaScript error constructor is captured as `__JSError` first.

pub const PRELUDE: &str = r#"// Lambdawg runtime prelude
const __JSError = Error;
const __fail = (message) => { throw new __JSError(message); };
const __lambdawg = {
  Ok: (value) => ({ __tag: "Ok", value }),
  Error: (value) => ({ __tag: "Error", value }),
  Some: (value) => ({ __tag: "Some", value }),
  None: { __tag: "None" },
  isOk: (r) => r.__tag === "Ok",
  isError: (r) => r.__tag === "Error",
  isSome: (o) => o.__tag === "Some",
  isNone: (o) => o.__tag === "None",
  unwrap: (r) => {
    if (r && r.__tag === "Error") { __fail("unwrap of Error: " + JSON.stringify(r.value)); }
    if (r && r.__tag === "None") { __fail("unwrap of None"); }
    if (r && (r.__tag === "Ok" || r.__tag === "Some")) { return r.value; }
    return r;
  },
  match: (value, arms) => {
    const tag = value && value.__tag;
    if (tag && arms[tag]) { return arms[tag](value.value !== undefined ? value.value : value); }
    if (arms._) { return arms._(value); }
    __fail("non-exhaustive pattern match");
  },
  map: (fn, list) => list.map((x) => fn(x)),
  filter: (fn, list) => list.filter((x) => fn(x)),
  fold: (fn, init, list) => list.reduce((acc, x) => fn(acc, x), init),
  sum: (list) => list.reduce((a, b) => a + b, 0),
  length: (list) => list.length,
  head: (list) => (list.length > 0 ? { __tag: "Some", value: list[0] } : { __tag: "None" }),
  tail: (list) => (list.length > 0 ? { __tag: "Some", value: list.slice(1) } : { __tag: "None" }),
  show: (value) => (typeof value === "string" ? value : JSON.stringify(value)),
  identity: (x) => x,
  tap: (fn, x) => { fn(x); return x; },
  pipe: (value, fn) => fn(value),
};
const { Ok, Error, Some, None, isOk, isError, isSome, isNone, unwrap, match, map, filter, fold, sum, length, head, tail, show, identity, tap, pipe } = __lambdawg;
"#;
