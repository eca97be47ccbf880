mod mapper;

pub(crate) use mapper::to_test_config;
