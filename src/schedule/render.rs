// src/schedule/render.rs

//! Textual renderings of a schedule.

use std::fmt::Write as _;

use crate::graph::TaskGraph;
use crate::schedule::partial::PartialSchedule;

/// `(task,processor,start);` for every committed task in decision order.
///
/// A single task `t1` of weight 5 on one processor renders as `(t1,0,0);`.
pub fn render_triples(graph: &TaskGraph, schedule: &PartialSchedule) -> String {
    let mut out = String::new();
    for a in schedule.assignments() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "({},{},{});",
            graph.task_name(a.task),
            a.processor,
            a.start
        );
    }
    out
}

/// The input graph re-emitted as DOT, with `Start` and `Processor` added to
/// every scheduled node.
pub fn render_dot(graph: &TaskGraph, schedule: &PartialSchedule) -> String {
    let name = if graph.name().is_empty() {
        "schedule"
    } else {
        graph.name()
    };

    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", quote(name));

    for id in graph.ids() {
        let state = schedule.state(id);
        if state.is_scheduled() {
            let _ = writeln!(
                out,
                "\t{}\t [Weight={}, Start={}, Processor={}];",
                quote(graph.task_name(id)),
                graph.weight(id),
                state.start_time(),
                state.processor()
            );
        } else {
            let _ = writeln!(
                out,
                "\t{}\t [Weight={}];",
                quote(graph.task_name(id)),
                graph.weight(id)
            );
        }
    }

    for (from, to, cost) in graph.edges() {
        let _ = writeln!(
            out,
            "\t{} -> {}\t [Weight={}];",
            quote(graph.task_name(from)),
            quote(graph.task_name(to)),
            cost
        );
    }

    out.push_str("}\n");
    out
}

fn quote(id: &str) -> String {
    let plain = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if plain {
        id.to_string()
    } else {
        format!("\"{}\"", id.replace('"', "\\\""))
    }
}
