pub mod feature_registry;
