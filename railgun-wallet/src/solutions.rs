//! Spending-solution planner.
//!
//! The proving circuit only accepts 1, 2 or 8 input nullifiers, so input
//! selection is a feasibility search over valid cardinalities rather than a
//! greedy exact match: a valid smaller spend beats an invalid exact one, and
//! an oversized batch is only emitted when no smaller valid count can cover
//! the target.

use ruint::aliases::U256;

use railgun_core::note::{Note, TxId};

use crate::error::SolutionError;
use crate::wallet::{TreeBalance, Txo};

/// Input cardinalities accepted by the proving circuit.
pub const VALID_INPUT_COUNTS: [usize; 3] = [1, 2, 8];

/// One circuit invocation worth of inputs and outputs within a single tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSolutionGroup {
    /// Tree the inputs are spent from.
    pub spending_tree: u32,
    /// Input outputs consumed by this group.
    pub utxos: Vec<Txo>,
    /// Output notes created by this group.
    pub outputs: Vec<Note>,
    /// Value leaving the shielded pool; zero for transfers.
    pub withdraw_value: U256,
}

/// Sorts descending by value; ties keep their stable order, so zero-value
/// outputs sort last.
pub fn sort_utxos_by_size(utxos: &mut [Txo]) {
    utxos.sort_by(|a, b| b.value().cmp(&a.value()));
}

/// Smallest valid input count strictly greater than `count`.
#[must_use]
pub fn next_nullifier_target(count: usize) -> Option<usize> {
    VALID_INPUT_COUNTS.iter().copied().find(|&valid| valid > count)
}

fn is_valid_nullifier_count(count: usize) -> bool {
    VALID_INPUT_COUNTS.contains(&count)
}

fn total_spend(utxos: &[Txo]) -> U256 {
    utxos
        .iter()
        .fold(U256::ZERO, |acc, utxo| acc + U256::from(utxo.value()))
}

/// Whether the accumulation loop should take another input.
///
/// Once the target value is covered, inputs are only added to reach a valid
/// cardinality. Below the target, growth stops when no valid cardinality is
/// reachable from the remaining inputs.
#[must_use]
pub fn should_add_more_utxos_for_solution_batch(
    spending_utxos: &[Txo],
    all_utxos: &[Txo],
    required: U256,
) -> bool {
    let count = spending_utxos.len();
    if total_spend(spending_utxos) >= required {
        return !is_valid_nullifier_count(count);
    }
    let Some(target) = next_nullifier_target(count) else {
        return false;
    };
    if target > all_utxos.len() {
        return false;
    }
    true
}

/// Selects the next batch of inputs from `tree_balance` toward `required`,
/// skipping anything in `excluded_txids`. Returns `None` when the tree has
/// nothing left to offer; a zero-value output is never a batch on its own.
pub fn find_next_solution_batch(
    tree_balance: &TreeBalance,
    required: U256,
    excluded_txids: &[TxId],
) -> Result<Option<Vec<Txo>>, SolutionError> {
    let mut candidates: Vec<Txo> = tree_balance
        .utxos
        .iter()
        .filter(|utxo| !excluded_txids.contains(&utxo.txid))
        .cloned()
        .collect();
    if candidates.is_empty() {
        return Ok(None);
    }
    sort_utxos_by_size(&mut candidates);
    if candidates[0].value() == 0 {
        return Ok(None);
    }

    let mut batch: Vec<Txo> = Vec::new();
    for candidate in &candidates {
        if !should_add_more_utxos_for_solution_batch(&batch, &candidates, required) {
            break;
        }
        batch.push(candidate.clone());
    }

    if !is_valid_nullifier_count(batch.len()) {
        return Err(SolutionError::InvalidNullifierCount);
    }
    Ok(Some(batch))
}

/// Builds the groups satisfying one output, walking trees in order and
/// reserving consumed inputs in `excluded_txids`. When a batch covers only
/// part of the output, the output is split: a group is emitted for the
/// covered part and a synthetic note for the remainder is pushed to the
/// front of `remaining_outputs`.
pub fn create_spending_solution_groups_for_output(
    tree_sorted_balances: &[TreeBalance],
    output: &Note,
    remaining_outputs: &mut Vec<Note>,
    excluded_txids: &mut Vec<TxId>,
) -> Result<Vec<SpendingSolutionGroup>, SolutionError> {
    let mut groups = Vec::new();
    let mut amount_left = U256::from(output.value());

    for (tree, tree_balance) in tree_sorted_balances.iter().enumerate() {
        while amount_left > U256::ZERO {
            let Some(utxos) = find_next_solution_batch(tree_balance, amount_left, excluded_txids)?
            else {
                break;
            };
            excluded_txids.extend(utxos.iter().map(|utxo| utxo.txid));

            let batch_spend = total_spend(&utxos);
            let solution_value = batch_spend.min(amount_left);
            let solution_output = output.with_value(
                u128::try_from(solution_value).expect("bounded by a u128 output value"),
            );
            groups.push(SpendingSolutionGroup {
                spending_tree: tree as u32,
                utxos,
                outputs: vec![solution_output],
                withdraw_value: U256::ZERO,
            });

            if !remaining_outputs.is_empty() {
                remaining_outputs.remove(0);
            }
            amount_left = amount_left.saturating_sub(batch_spend);
            if amount_left > U256::ZERO {
                remaining_outputs.insert(
                    0,
                    output.with_value(
                        u128::try_from(amount_left).expect("bounded by a u128 output value"),
                    ),
                );
            }
        }
    }

    if amount_left > U256::ZERO {
        return Err(SolutionError::ConsolidateBalances);
    }
    Ok(groups)
}

/// Satisfies `outputs` in order with a shared reservation set. Outputs may
/// be split across batches and trees; the planner is not globally optimal
/// across many destinations, and surfaces the consolidation error when any
/// output cannot be satisfied from the remaining inputs.
pub fn create_complex_satisfying_spending_solution_groups(
    tree_sorted_balances: &[TreeBalance],
    outputs: &[Note],
) -> Result<Vec<SpendingSolutionGroup>, SolutionError> {
    let mut groups = Vec::new();
    let mut remaining_outputs: Vec<Note> = outputs.to_vec();
    let mut excluded_txids: Vec<TxId> = Vec::new();

    while let Some(output) = remaining_outputs.first().cloned() {
        let output_groups = create_spending_solution_groups_for_output(
            tree_sorted_balances,
            &output,
            &mut remaining_outputs,
            &mut excluded_txids,
        )?;
        if output_groups.is_empty() {
            return Err(SolutionError::ConsolidateBalances);
        }
        groups.extend(output_groups);
    }
    Ok(groups)
}

/// The single-batch path: every output must be covered by one batch from one
/// tree. A request that would need splitting is a circuit shape the protocol
/// does not offer and fails with the complex-circuit error.
pub fn create_simple_satisfying_spending_solution_groups(
    tree_sorted_balances: &[TreeBalance],
    outputs: &[Note],
) -> Result<Vec<SpendingSolutionGroup>, SolutionError> {
    let mut excluded_txids: Vec<TxId> = Vec::new();
    let mut groups = Vec::new();

    for output in outputs {
        let required = U256::from(output.value());
        let mut satisfied = false;
        for (tree, tree_balance) in tree_sorted_balances.iter().enumerate() {
            let Some(utxos) = find_next_solution_batch(tree_balance, required, &excluded_txids)?
            else {
                continue;
            };
            if total_spend(&utxos) < required {
                continue;
            }
            excluded_txids.extend(utxos.iter().map(|utxo| utxo.txid));
            groups.push(SpendingSolutionGroup {
                spending_tree: tree as u32,
                utxos,
                outputs: vec![output.clone()],
                withdraw_value: U256::ZERO,
            });
            satisfied = true;
            break;
        }
        if !satisfied {
            return Err(SolutionError::ComplexCircuitUnsupported);
        }
    }
    Ok(groups)
}
