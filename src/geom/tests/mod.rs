mod test_angle_basic;
mod test_buffer_basic;
