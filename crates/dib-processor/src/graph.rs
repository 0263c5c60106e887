//! Dependency graph checks over the descriptor arena

use dib_domain::{BindingDescriptor, DescriptorId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

/// Find dependency cycles among local references
///
/// Lazy references are not edges: a `Lazy<T>` handle breaks a cycle.
/// Iterative depth-first search with white/grey/black colouring. Every back
/// edge yields one cycle, listed in traversal order with the first descriptor
/// repeated at the end (`[A, B, A]`). Descriptors are visited in arena order,
/// so the output is deterministic.
pub fn find_cycles(descriptors: &[BindingDescriptor]) -> Vec<Vec<DescriptorId>> {
    let mut color = vec![Color::White; descriptors.len()];
    let mut cycles = Vec::new();

    for root in 0..descriptors.len() {
        if color[root] != Color::White {
            continue;
        }
        // (node, index of the next edge to follow)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        color[root] = Color::Grey;

        while let Some(top) = stack.last_mut() {
            let (node, edge) = *top;
            let next = descriptors[node]
                .construction_dependencies()
                .map(DescriptorId::index)
                .filter(|t| *t < descriptors.len())
                .nth(edge);
            top.1 += 1;

            match next {
                Some(target) => match color[target] {
                    Color::White => {
                        color[target] = Color::Grey;
                        stack.push((target, 0));
                    }
                    Color::Grey => {
                        let start = stack.iter().position(|(n, _)| *n == target).unwrap_or(0);
                        let mut cycle: Vec<DescriptorId> = stack[start..]
                            .iter()
                            .map(|(n, _)| descriptors[*n].id)
                            .collect();
                        cycle.push(descriptors[target].id);
                        cycles.push(cycle);
                    }
                    Color::Black => {}
                },
                None => {
                    color[node] = Color::Black;
                    stack.pop();
                }
            }
        }
    }

    cycles
}

/// Type names along a cycle
pub fn cycle_names(descriptors: &[BindingDescriptor], cycle: &[DescriptorId]) -> Vec<String> {
    cycle
        .iter()
        .filter_map(|id| descriptors.get(id.index()))
        .map(|d| d.key.to_string())
        .collect()
}
