pub mod delta_computation;
